//! Animation binary format (.anim)
//!
//! Sampled skinning matrices for every bone that moves during the clip.
//!
//! # Layout
//! ```text
//! Header (16 bytes):
//! 0x00: magic u32 (0xee334507)
//! 0x04: frame_count u32
//! 0x08: frame_duration_us u32
//! 0x0C: animated_bone_count u32
//!
//! Body:
//! bone names          animated_bone_count × string
//! plain matrices      frame_count × animated_bone_count × 16 f32 (identity)
//! pre-multiplied      frame_count × animated_bone_count × 16 f32
//! ```
//!
//! Matrices are stored frame-major: [frame0_bone0, frame0_bone1, ..., frame1_bone0, ...]

/// Magic number at the start of every animation file
pub const ANIMATION_MAGIC: u32 = 0xee33_4507;

/// Animation file extension
pub const ANIMATION_EXT: &str = "anim";

/// Frame duration in whole microseconds for a frame rate
#[inline]
pub fn frame_duration_micros(fps: f32) -> u32 {
    if fps > 0.0 {
        (1_000_000.0 / fps) as u32
    } else {
        0
    }
}

/// Animation header (16 bytes, magic included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    pub frame_count: u32,
    pub frame_duration_us: u32,
    pub animated_bone_count: u32,
}

impl AnimationHeader {
    pub const SIZE: usize = 16;

    pub fn new(frame_count: u32, frame_duration_us: u32, animated_bone_count: u32) -> Self {
        Self {
            frame_count,
            frame_duration_us,
            animated_bone_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&ANIMATION_MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.frame_duration_us.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.animated_bone_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let word =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        if word(0) != ANIMATION_MAGIC {
            return None;
        }
        Some(Self {
            frame_count: word(4),
            frame_duration_us: word(8),
            animated_bone_count: word(12),
        })
    }

    /// Size of the two matrix sections in bytes
    pub fn matrix_data_size(&self) -> usize {
        2 * self.frame_count as usize * self.animated_bone_count as usize * 64
    }
}
