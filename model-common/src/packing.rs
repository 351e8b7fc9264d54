//! Vertex attribute packing utilities
//!
//! Provides functions to convert f32 vertex data to the engine's packed formats:
//! - UV → unorm16x2 with V flipped
//! - normal/tangent → 10-10-10(-2) fixed point in a u32
//! - bone weights → unorm8x4
//!
//! All inputs are expected in engine space already (see [`crate::coords`]).

use glam::Vec3;

// ============================================================================
// Constants
// ============================================================================

/// Scale applied to each direction component before truncation
pub const DIRECTION_SCALE: f32 = 511.0;

/// Mask for one 10-bit direction field
const FIELD_MASK: i32 = 1023;

/// Handedness bits for a tangent whose bitangent multiplier is -1
pub const TANGENT_SIGN_NEGATIVE: u32 = 1 << 30;

/// Handedness bits for every other tangent
pub const TANGENT_SIGN_POSITIVE: u32 = 3 << 30;

/// Bone index written when a vertex group names a bone that does not exist
pub const BONE_NOT_FOUND: u8 = u8::MAX;

/// Largest vertex count that still uses 16-bit indices
pub const MAX_U16_INDEXED_VERTICES: usize = 65536;

// ============================================================================
// UV Packing
// ============================================================================

/// Pack a UV coordinate to unorm16x2, flipping V (`1 - v`)
#[inline]
pub fn pack_uv_unorm16(uv: [f32; 2]) -> [u16; 2] {
    [
        (uv[0].clamp(0.0, 1.0) * 65535.0) as u16,
        ((1.0 - uv[1]).clamp(0.0, 1.0) * 65535.0) as u16,
    ]
}

/// Pack a UV into the 32-bit word stored in the texcoord array
///
/// A missing UV is the zero word, indistinguishable from a UV of `(0, 1)`.
#[inline]
pub fn pack_uv_word(uv: Option<[f32; 2]>) -> u32 {
    match uv {
        Some(uv) => {
            let [u, v] = pack_uv_unorm16(uv);
            u as u32 | ((v as u32) << 16)
        }
        None => 0,
    }
}

// ============================================================================
// Direction Packing
// ============================================================================

#[inline]
fn quantize(component: f32) -> i32 {
    (component.clamp(-1.0, 1.0) * DIRECTION_SCALE) as i32 & FIELD_MASK
}

/// Pack a direction into `(z << 20) | (y << 10) | x`, 10 bits per axis
#[inline]
pub fn pack_direction_10_10_10(v: Vec3) -> u32 {
    (quantize(v.x) | (quantize(v.y) << 10) | (quantize(v.z) << 20)) as u32
}

/// Pack a tangent with its handedness in bits 30-31
#[inline]
pub fn pack_tangent_10_10_10_2(v: Vec3, bitangent_sign: f32) -> u32 {
    let sign = if bitangent_sign == -1.0 {
        TANGENT_SIGN_NEGATIVE
    } else {
        TANGENT_SIGN_POSITIVE
    };
    pack_direction_10_10_10(v) | sign
}

/// Unpack a 10-10-10 word back to a direction (each axis within ±1/511)
#[inline]
pub fn unpack_direction_10_10_10(packed: u32) -> Vec3 {
    let field = |shift: u32| {
        // Sign-extend the 10-bit two's complement field
        let raw = ((packed >> shift) & FIELD_MASK as u32) as i32;
        ((raw << 22) >> 22) as f32 / DIRECTION_SCALE
    };
    Vec3::new(field(0), field(10), field(20))
}

/// Bitangent multiplier encoded in a packed tangent word
#[inline]
pub fn tangent_sign(packed: u32) -> f32 {
    if packed & TANGENT_SIGN_POSITIVE == TANGENT_SIGN_NEGATIVE {
        -1.0
    } else {
        1.0
    }
}

// ============================================================================
// Bone Weight Packing
// ============================================================================

/// Pack bone weights as unorm8x4 (`floor(w * 255)`)
#[inline]
pub fn pack_bone_weights_unorm8(weights: [f32; 4]) -> [u8; 4] {
    weights.map(|w| (w.clamp(0.0, 1.0) * 255.0) as u8)
}

// ============================================================================
// Index Width
// ============================================================================

/// Element width of the index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Pick the index width for a model with `vertex_count` vertices
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count <= MAX_U16_INDEXED_VERTICES {
            Self::U16
        } else {
            Self::U32
        }
    }

    /// Encoded size of `index_count` indices, including the alignment pad word
    pub fn encoded_len(self, index_count: usize) -> usize {
        match self {
            Self::U16 => (index_count + index_count % 2) * 2,
            Self::U32 => index_count * 4,
        }
    }
}
