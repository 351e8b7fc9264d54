//! Export options
//!
//! Defaults match what the engine's content pipeline expects. Every option can
//! be set from the manifest (flattened into a job table) or overridden on the
//! command line.

use model_common::{attribute_mask, COMPRESSED_MODEL_SUFFIX, MODEL_EXT};
use serde::Deserialize;

use crate::error::{ExportError, ExportResult};

fn yes() -> bool {
    true
}

/// Options for `.model` export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModelOptions {
    /// Export bone indices/weights and the bone hierarchy
    #[serde(default = "yes")]
    pub bones: bool,
    /// Export texture coordinates
    #[serde(default = "yes")]
    pub tex_coords: bool,
    /// Give every face its own normal instead of per-vertex normals
    #[serde(default)]
    pub flat_shading: bool,
    /// Export tangents (needed for normal maps, requires tex coords)
    #[serde(default = "yes")]
    pub tangents: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            bones: true,
            tex_coords: true,
            flat_shading: false,
            tangents: true,
        }
    }
}

impl ModelOptions {
    pub fn validate(&self) -> ExportResult<()> {
        if self.tangents && !self.tex_coords {
            return Err(ExportError::TangentsRequireTexCoords);
        }
        Ok(())
    }

    pub fn attrib_mask(&self) -> u32 {
        attribute_mask(self.tex_coords, self.bones, self.tangents)
    }
}

/// Options for `.scene` export
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SceneOptions {
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    /// Reference `*.model.compressed` instead of `*.model`
    #[serde(default = "yes")]
    pub compressed_models: bool,
    /// Flag every mesh renderer material slot as flat shaded
    #[serde(default = "yes")]
    pub flat_shading: bool,
    #[serde(default = "default_specular_size")]
    pub specular_size: f32,
    #[serde(default = "default_specular_intensity")]
    pub specular_intensity: f32,
    #[serde(default = "default_specular_tint")]
    pub specular_tint: f32,
}

fn default_ambient() -> [f32; 3] {
    [0.1, 0.1, 0.15]
}

fn default_clear_color() -> [f32; 3] {
    [0.1, 0.1, 0.15]
}

fn default_specular_size() -> f32 {
    0.05
}

fn default_specular_intensity() -> f32 {
    1.0
}

fn default_specular_tint() -> f32 {
    0.025
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            ambient: default_ambient(),
            clear_color: default_clear_color(),
            compressed_models: true,
            flat_shading: true,
            specular_size: default_specular_size(),
            specular_intensity: default_specular_intensity(),
            specular_tint: default_specular_tint(),
        }
    }
}

impl SceneOptions {
    /// File name suffix for model assets referenced by the scene
    pub fn model_suffix(&self) -> String {
        if self.compressed_models {
            COMPRESSED_MODEL_SUFFIX.to_string()
        } else {
            format!(".{}", MODEL_EXT)
        }
    }
}
