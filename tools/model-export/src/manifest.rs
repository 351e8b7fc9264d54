//! Manifest parsing and build orchestration
//!
//! Parses export.toml and runs every export job it lists:
//!
//! ```toml
//! [output]
//! dir = "build/"
//!
//! [[model]]
//! name = "farm"
//! source = "farm.json"
//! flat_shading = true
//!
//! [[scene]]
//! name = "farm"
//! source = "farm.json"
//! compressed_models = false
//!
//! [[animation]]
//! name = "walk"
//! source = "minotaur_walk.json"
//! ```
//!
//! Relative source paths are resolved against the manifest's directory.

use anyhow::{bail, Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::options::{ModelOptions, SceneOptions};
use crate::{ANIMATION_EXT, MODEL_EXT, SCENE_EXT};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "model")]
    pub models: Vec<ModelJob>,
    #[serde(default, rename = "scene")]
    pub scenes: Vec<SceneJob>,
    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationJob>,
    /// Directory containing the manifest file
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

#[derive(Debug, Deserialize)]
pub struct ModelJob {
    pub name: String,
    pub source: PathBuf,
    #[serde(flatten)]
    pub options: ModelOptions,
}

#[derive(Debug, Deserialize)]
pub struct SceneJob {
    pub name: String,
    pub source: PathBuf,
    #[serde(flatten)]
    pub options: SceneOptions,
}

#[derive(Debug, Deserialize)]
pub struct AnimationJob {
    pub name: String,
    pub source: PathBuf,
}

impl Manifest {
    /// Source path as seen from the current directory
    pub fn resolve(&self, source: &Path) -> PathBuf {
        self.base_dir.join(source)
    }

    fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.dir)
    }

    fn sources(&self) -> impl Iterator<Item = (&'static str, &str, &Path)> + '_ {
        let models = self
            .models
            .iter()
            .map(|j| ("Model", j.name.as_str(), j.source.as_path()));
        let scenes = self
            .scenes
            .iter()
            .map(|j| ("Scene", j.name.as_str(), j.source.as_path()));
        let animations = self
            .animations
            .iter()
            .map(|j| ("Animation", j.name.as_str(), j.source.as_path()));
        models.chain(scenes).chain(animations)
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    // Check that all source files exist
    for (kind, name, source) in manifest.sources() {
        let path = manifest.resolve(source);
        if !path.exists() {
            bail!("{} '{}' source not found: {:?}", kind, name, path);
        }
    }

    for job in &manifest.models {
        job.options
            .validate()
            .with_context(|| format!("Model '{}' has invalid options", job.name))?;
    }

    // Output file names must not collide
    let mut seen = HashSet::new();
    for (kind, name, _) in manifest.sources() {
        if !seen.insert((kind, name)) {
            bail!("{} '{}' is listed more than once", kind, name);
        }
    }

    Ok(())
}

/// Build all assets from a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    validate(manifest)?;

    let output_dir = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest.output_dir());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    for job in &manifest.models {
        let output = output_dir.join(format!("{}.{}", job.name, MODEL_EXT));
        tracing::info!("Converting model: {} -> {:?}", job.name, output);
        crate::mesh::convert_model(&manifest.resolve(&job.source), &output, &job.options)?;
    }

    for job in &manifest.scenes {
        let output = output_dir.join(format!("{}.{}", job.name, SCENE_EXT));
        tracing::info!("Converting scene: {} -> {:?}", job.name, output);
        crate::scene::convert_scene(&manifest.resolve(&job.source), &output, &job.options)?;
    }

    for job in &manifest.animations {
        let output = output_dir.join(format!("{}.{}", job.name, ANIMATION_EXT));
        tracing::info!("Converting animation: {} -> {:?}", job.name, output);
        crate::animation::convert_animation(&manifest.resolve(&job.source), &output)?;
    }

    tracing::info!(
        "Built {} models, {} scenes, {} animations",
        manifest.models.len(),
        manifest.scenes.len(),
        manifest.animations.len()
    );

    Ok(())
}
