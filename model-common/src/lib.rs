//! Shared types and utilities for the engine asset exporter
//!
//! This crate provides everything that depends only on the byte layout the
//! engine expects, shared between:
//! - `model-export` (asset pipeline and CLI)
//! - tests and tools that read exported files back
//!
//! # Modules
//!
//! - [`codec`] - Little-endian primitive writers/readers, padded strings, matrices
//! - [`coords`] - Authoring (Z-up) to engine (Y-up) coordinate conversion
//! - [`packing`] - Vertex attribute packing (10-10-10-2, unorm16, unorm8)
//! - [`formats`] - Model, scene and animation file headers and constants

pub mod codec;
pub mod coords;
pub mod formats;
pub mod packing;

// Re-export the codec surface
pub use codec::{
    ByteReader, CodecError, CodecResult, FIXED_NAME_LEN, MAX_STRING_LEN, WriteBinary,
    encoded_string_len, string_padding,
};

// Re-export coordinate conversion
pub use coords::{TO_AUTHORING, TO_ENGINE, convert_matrix, to_engine};

// Re-export commonly used packing items
pub use packing::{
    BONE_NOT_FOUND, IndexWidth, MAX_U16_INDEXED_VERTICES, pack_bone_weights_unorm8,
    pack_direction_10_10_10, pack_tangent_10_10_10_2, pack_uv_unorm16, pack_uv_word,
    tangent_sign, unpack_direction_10_10_10,
};

// Re-export commonly used format items
pub use formats::{
    ANIMATION_EXT, ANIMATION_MAGIC, ATTRIB_BONE_INDICES, ATTRIB_BONE_WEIGHTS, ATTRIB_NORMAL,
    ATTRIB_POSITION, ATTRIB_TANGENT, ATTRIB_TEXCOORD, AnimationHeader, BinarySerializable,
    COMPRESSED_MODEL_SUFFIX, LightType, MATERIAL_SLOTS, MODEL_EXT, MODEL_MAGIC, ModelHeader,
    NO_PARENT, NO_TEXTURE, SCENE_EXT, SCENE_MAGIC, SceneHeader, attribute_mask,
    frame_duration_micros, vertex_attribute_size,
};
