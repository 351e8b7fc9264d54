//! model-export library
//!
//! Converts authoring scene snapshots into the engine's `.model`, `.scene`
//! and `.anim` files. Every converter comes as a pair: `convert_*_to_memory`
//! returns the laid-out data for inspection or packing, `convert_*` writes
//! the file.

pub mod animation;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod manifest;
pub mod mesh;
pub mod options;
pub mod scene;
pub mod skeleton;
pub mod source;

// Re-export file extensions and magic numbers from model-common
pub use model_common::{
    ANIMATION_EXT, ANIMATION_MAGIC, COMPRESSED_MODEL_SUFFIX, MODEL_EXT, MODEL_MAGIC, SCENE_EXT,
    SCENE_MAGIC,
};

pub use error::{ExportError, ExportResult};
pub use options::{ModelOptions, SceneOptions};
pub use source::{SceneSnapshot, SceneSource};

// Re-export key types for each converter
pub use animation::{convert_animation, convert_animation_to_memory, ConvertedAnimation};
pub use mesh::{convert_model, convert_model_to_memory, ConvertedModel};
pub use scene::{convert_scene, convert_scene_to_memory, ConvertedScene};
