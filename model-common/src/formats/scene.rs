//! Scene binary format (.scene)
//!
//! Lists the model assets a level needs and places mesh renderers and lights.
//!
//! # Layout
//! ```text
//! 0x00: magic u32 (0x1a98fd34)
//! 0x04: ambient 3×f32
//! 0x10: clear_color 3×f32
//! 0x1C: asset_name_words u32   - size of the asset name block in 4-byte words
//!       asset_count u32, asset names (string, ".model" or ".model.compressed")
//!       mesh_count u32, meshes {asset_index u32, read_only u32 = 0}
//!       texture_count u32 (0)
//!       object_count u32, objects:
//!         name [u8; 16], parent i32 (-1), has_mesh u32, has_light u32,
//!         is_camera u32, inherits_parent_transform u32 (0), world 16×f32
//!         if has_mesh:  mesh_index u32, 32 × material slot
//!                       {texture i32, normal_map i32, spec_size f32,
//!                        spec_intensity f32, spec_tint f32, flat_shading u32}
//!         if has_light: light_type u32, colour 3×f32, cast_shadows u32,
//!                       shadow_near f32, shadow_far f32, [spot_angle f32]
//! ```

use crate::codec::encoded_string_len;

/// Magic number at the start of every scene file
pub const SCENE_MAGIC: u32 = 0x1a98_fd34;

/// Scene file extension
pub const SCENE_EXT: &str = "scene";

/// Number of material slots written for every mesh renderer
pub const MATERIAL_SLOTS: usize = 32;

/// Parent index of an object without a parent
pub const NO_PARENT: i32 = -1;

/// Texture index of an unassigned texture slot
pub const NO_TEXTURE: i32 = -1;

/// Light type as encoded in the scene file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightType {
    Point = 0,
    Spot = 1,
    Directional = 2,
}

impl LightType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Point),
            1 => Some(Self::Spot),
            2 => Some(Self::Directional),
            _ => None,
        }
    }
}

/// Number of 4-byte words an asset name occupies in the asset name block
#[inline]
pub fn asset_name_words(file_name: &str) -> u32 {
    (encoded_string_len(file_name.len()) / 4) as u32
}

/// Scene header (28 bytes, magic included)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHeader {
    pub ambient: [f32; 3],
    pub clear_color: [f32; 3],
}

impl SceneHeader {
    pub const SIZE: usize = 28;

    pub fn new(ambient: [f32; 3], clear_color: [f32; 3]) -> Self {
        Self {
            ambient,
            clear_color,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&SCENE_MAGIC.to_le_bytes());
        for (i, f) in self.ambient.iter().chain(&self.clear_color).enumerate() {
            let at = 4 + i * 4;
            bytes[at..at + 4].copy_from_slice(&f.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let word = |i: usize| [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
        if u32::from_le_bytes(word(0)) != SCENE_MAGIC {
            return None;
        }
        let float = |n: usize| f32::from_le_bytes(word(4 + n * 4));
        Some(Self {
            ambient: [float(0), float(1), float(2)],
            clear_color: [float(3), float(4), float(5)],
        })
    }
}
