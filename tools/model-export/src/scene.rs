//! Scene converter (scene snapshot -> .scene)
//!
//! Places one mesh renderer per mesh object and one light per light object.
//! Mesh objects that are duplicates of each other (`Rock`, `Rock.001`, ...)
//! share one model asset.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use model_common::{convert_matrix, LightType, SceneHeader};
use std::collections::BTreeSet;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use crate::error::ExportResult;
use crate::formats::{write_atomic, write_scene};
use crate::options::SceneOptions;
use crate::source::{LightData, LightKind, SceneSnapshot, SceneSource};

/// Strip a `.NNN` duplicate marker from an object name
///
/// `"Rock.001"` becomes `"Rock"`. Names that are only a marker, or whose
/// suffix is not exactly three digits, are returned unchanged.
pub fn strip_duplicate_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, digits))
            if !base.is_empty()
                && digits.len() == 3
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

/// Per-slot material settings written for every mesh renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotSettings {
    pub specular_size: f32,
    pub specular_intensity: f32,
    pub specular_tint: f32,
    pub flat_shading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEntry {
    pub light_type: LightType,
    /// Colour pre-multiplied by energy
    pub color: Vec3,
    pub shadow_near: f32,
    pub shadow_far: f32,
    /// Cone angle, spot lights only
    pub spot_angle: Option<f32>,
}

impl LightEntry {
    fn from_light(light: &LightData) -> Self {
        let light_type = match light.light_type {
            LightKind::Point => LightType::Point,
            LightKind::Spot => LightType::Spot,
            LightKind::Sun | LightKind::Area => LightType::Directional,
        };
        Self {
            light_type,
            color: Vec3::from(light.color) * light.energy,
            shadow_near: light.shadow_clip_start,
            shadow_far: light.shadow_cascade_max_distance,
            spot_angle: (light_type == LightType::Spot).then_some(light.spot_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectRole {
    /// Renders the mesh at this index of the scene's mesh list
    Mesh { mesh_index: u32 },
    Light(LightEntry),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub name: String,
    /// World transform, engine coordinates
    pub world: Mat4,
    pub role: ObjectRole,
}

/// Result of in-memory scene conversion
#[derive(Debug, Clone)]
pub struct ConvertedScene {
    pub header: SceneHeader,
    /// Asset file names, sorted; mesh `i` uses asset `i`
    pub assets: Vec<String>,
    pub slots: SlotSettings,
    pub objects: Vec<SceneEntry>,
}

impl ConvertedScene {
    pub fn mesh_count(&self) -> usize {
        self.assets.len()
    }

    pub fn light_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| matches!(o.role, ObjectRole::Light(_)))
            .count()
    }
}

/// Lay out a scene in memory
///
/// Mesh objects come first, then lights, each in scene order.
pub fn convert_scene_to_memory<S: SceneSource>(
    scene: &S,
    options: &SceneOptions,
) -> ExportResult<ConvertedScene> {
    let suffix = options.model_suffix();

    let stems: BTreeSet<&str> = scene
        .meshes()
        .map(|m| strip_duplicate_suffix(&m.object.name))
        .collect();
    let stems: Vec<&str> = stems.into_iter().collect();

    let mut objects = Vec::new();

    for entry in scene.meshes() {
        let stem = strip_duplicate_suffix(&entry.object.name);
        // Every stem was inserted above
        let mesh_index = stems.binary_search(&stem).unwrap_or_default() as u32;
        objects.push(SceneEntry {
            name: entry.object.name.clone(),
            world: convert_matrix(entry.object.world()),
            role: ObjectRole::Mesh { mesh_index },
        });
    }

    let rotate_light = Mat4::from_rotation_x(-FRAC_PI_2);
    for entry in scene.lights() {
        objects.push(SceneEntry {
            name: entry.object.name.clone(),
            world: convert_matrix(entry.object.world() * rotate_light),
            role: ObjectRole::Light(LightEntry::from_light(entry.light)),
        });
    }

    Ok(ConvertedScene {
        header: SceneHeader::new(options.ambient, options.clear_color),
        assets: stems
            .iter()
            .map(|stem| format!("{}{}", stem, suffix))
            .collect(),
        slots: SlotSettings {
            specular_size: options.specular_size,
            specular_intensity: options.specular_intensity,
            specular_tint: options.specular_tint,
            flat_shading: options.flat_shading,
        },
        objects,
    })
}

/// Encode a converted scene into file bytes
pub fn encode_scene(scene: &ConvertedScene) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_scene(&mut bytes, scene)?;
    Ok(bytes)
}

/// Convert a scene snapshot to a .scene file
pub fn convert_scene(input: &Path, output: &Path, options: &SceneOptions) -> Result<()> {
    let snapshot = SceneSnapshot::load(input)?;
    let scene = convert_scene_to_memory(&snapshot, options)
        .with_context(|| format!("Failed to convert scene: {:?}", input))?;
    let bytes = encode_scene(&scene)?;
    write_atomic(output, &bytes)?;

    tracing::info!(
        "Converted scene: {} assets, {} objects ({} lights)",
        scene.assets.len(),
        scene.objects.len(),
        scene.light_count()
    );

    Ok(())
}
