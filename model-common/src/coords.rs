//! Authoring-space to engine-space conversion
//!
//! The authoring tool is right-handed Z-up; the engine is Y-up.
//! The change of basis is `y' = z, z' = -y`. Raw vectors only need a component
//! shuffle ([`to_engine`]); full transforms are conjugated
//! ([`convert_matrix`]: `C · M · C⁻¹`).

use glam::{Mat4, Vec3, Vec4};

/// Basis change from authoring space to engine space (`C`)
pub const TO_ENGINE: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::new(0.0, 0.0, -1.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::W,
);

/// Inverse basis change (`C⁻¹`)
pub const TO_AUTHORING: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.0, -1.0, 0.0, 0.0),
    Vec4::W,
);

/// Convert a position, normal or tangent: `[x, y, z] -> [x, z, -y]`
#[inline]
pub fn to_engine(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Convert a full transform: `C · m · C⁻¹`
#[inline]
pub fn convert_matrix(m: Mat4) -> Mat4 {
    TO_ENGINE * m * TO_AUTHORING
}
