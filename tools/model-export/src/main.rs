//! model-export - engine asset export tool
//!
//! Converts authoring scene snapshots (JSON) to the engine's binary formats
//! (.model, .scene, .anim)

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// Use modules from library
use model_export::{
    animation, inspect, manifest, mesh, scene, ModelOptions, SceneOptions, ANIMATION_EXT,
    MODEL_EXT, SCENE_EXT,
};

#[derive(Parser)]
#[command(name = "model-export")]
#[command(about = "Engine asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,
    },

    /// Export every mesh of a scene snapshot as one model
    Model {
        /// Input scene snapshot (.json)
        input: PathBuf,

        /// Output .model file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: ModelFlags,
    },

    /// Export mesh and light placement of a scene snapshot
    Scene {
        /// Input scene snapshot (.json)
        input: PathBuf,

        /// Output .scene file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference `.model` assets instead of `.model.compressed`
        #[arg(long)]
        uncompressed_models: bool,

        /// Do not flag mesh materials as flat shaded
        #[arg(long)]
        smooth_shading: bool,
    },

    /// Export the armature animation of a scene snapshot
    Animation {
        /// Input scene snapshot (.json)
        input: PathBuf,

        /// Output .anim file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the header and counts of an exported file
    Inspect {
        /// Exported .model, .scene or .anim file
        input: PathBuf,
    },
}

#[derive(Args)]
struct ModelFlags {
    /// Skip bone indices, weights and the bone hierarchy
    #[arg(long)]
    no_bones: bool,

    /// Skip texture coordinates (requires --no-tangents)
    #[arg(long)]
    no_tex_coords: bool,

    /// Use per-face normals
    #[arg(long)]
    flat_shading: bool,

    /// Skip tangents
    #[arg(long)]
    no_tangents: bool,
}

impl ModelFlags {
    fn options(&self) -> ModelOptions {
        ModelOptions {
            bones: !self.no_bones,
            tex_coords: !self.no_tex_coords,
            flat_shading: self.flat_shading,
            tangents: !self.no_tangents,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building assets from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Model {
            input,
            output,
            flags,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(MODEL_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            mesh::convert_model(&input, &output, &flags.options())?;
            tracing::info!("Done!");
        }

        Commands::Scene {
            input,
            output,
            uncompressed_models,
            smooth_shading,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(SCENE_EXT));
            let options = SceneOptions {
                compressed_models: !uncompressed_models,
                flat_shading: !smooth_shading,
                ..SceneOptions::default()
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);
            scene::convert_scene(&input, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Animation { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(ANIMATION_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            animation::convert_animation(&input, &output)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            let summary = inspect::inspect_file(&input)?;
            tracing::info!("{:?}: {}", input, summary);
        }
    }

    Ok(())
}
