//! Model binary format (.model)
//!
//! Deduplicated, non-interleaved vertex arrays plus per-material index ranges
//! and the flattened bone hierarchy.
//!
//! # Layout
//! ```text
//! 0x00: magic u32 (0xaaeecdbb)
//! 0x04: index_count u32
//! 0x08: attrib_mask u32
//! 0x0C: interleaved u32 (always 0)
//! 0x10: vertex_count u32
//! 0x14: positions     vertex_count × 3 f32
//!       texcoords     vertex_count × (u16, u16)      if ATTRIB_TEXCOORD
//!       normals       vertex_count × u32 (10-10-10)
//!       bone indices  vertex_count × 4 u8            if ATTRIB_BONE_INDICES
//!       bone weights  vertex_count × 4 u8            if ATTRIB_BONE_WEIGHTS
//!       tangents      vertex_count × u32 (10-10-10-2) if ATTRIB_TANGENT
//!       indices       u16 (+1 pad word if odd) or u32, see `IndexWidth`
//!       material_count u32, materials {start u32, count u32, rgb 3×f32, name string}
//!       bone_count u32, bones {head 3×f32, tail 3×f32, parent i32, name string}
//! ```

/// Magic number at the start of every model file
pub const MODEL_MAGIC: u32 = 0xaaee_cdbb;

/// Model file extension
pub const MODEL_EXT: &str = "model";

/// Suffix the scene file uses when it references compressed models
pub const COMPRESSED_MODEL_SUFFIX: &str = ".model.compressed";

/// Attribute flag: positions (always set)
pub const ATTRIB_POSITION: u32 = 1 << 0;
/// Attribute flag: texture coordinates
pub const ATTRIB_TEXCOORD: u32 = 1 << 2;
/// Attribute flag: normals (always set)
pub const ATTRIB_NORMAL: u32 = 1 << 3;
/// Attribute flag: bone indices
pub const ATTRIB_BONE_INDICES: u32 = 1 << 4;
/// Attribute flag: bone weights
pub const ATTRIB_BONE_WEIGHTS: u32 = 1 << 5;
/// Attribute flag: tangents
pub const ATTRIB_TANGENT: u32 = 1 << 6;

/// Build the attribute mask for a model export
#[inline]
pub const fn attribute_mask(tex_coords: bool, bones: bool, tangents: bool) -> u32 {
    let mut mask = ATTRIB_POSITION | ATTRIB_NORMAL;

    if tex_coords {
        mask |= ATTRIB_TEXCOORD;
    }
    if bones {
        mask |= ATTRIB_BONE_INDICES | ATTRIB_BONE_WEIGHTS;
    }
    if tangents {
        mask |= ATTRIB_TANGENT;
    }

    mask
}

/// Bytes of vertex data per vertex across all attribute arrays
#[inline]
pub const fn vertex_attribute_size(mask: u32) -> usize {
    let mut size = 12 + 4; // Position f32x3 + packed normal

    if mask & ATTRIB_TEXCOORD != 0 {
        size += 4;
    }
    if mask & ATTRIB_BONE_INDICES != 0 {
        size += 4;
    }
    if mask & ATTRIB_BONE_WEIGHTS != 0 {
        size += 4;
    }
    if mask & ATTRIB_TANGENT != 0 {
        size += 4;
    }

    size
}

/// Model header (20 bytes, magic included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    pub index_count: u32,
    pub attrib_mask: u32,
    pub interleaved: u32,
    pub vertex_count: u32,
}

impl ModelHeader {
    pub const SIZE: usize = 20;

    pub fn new(index_count: u32, attrib_mask: u32, vertex_count: u32) -> Self {
        Self {
            index_count,
            attrib_mask,
            interleaved: 0,
            vertex_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&MODEL_MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.attrib_mask.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.interleaved.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    ///
    /// Returns `None` if the data is too short or the magic does not match.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let word =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        if word(0) != MODEL_MAGIC {
            return None;
        }
        Some(Self {
            index_count: word(4),
            attrib_mask: word(8),
            interleaved: word(12),
            vertex_count: word(16),
        })
    }

    pub fn has(&self, flag: u32) -> bool {
        self.attrib_mask & flag != 0
    }
}
