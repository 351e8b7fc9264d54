//! Model converter (scene snapshot -> .model)
//!
//! Welds every mesh object in the scene into one vertex array, then converts
//! the records to world-space engine coordinates and packs their attributes.

pub mod materials;
pub mod skinning;
pub mod weld;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use model_common::{
    pack_direction_10_10_10, pack_tangent_10_10_10_2, pack_uv_word, to_engine, IndexWidth,
};
use std::path::Path;

use crate::error::ExportResult;
use crate::formats::{write_atomic, write_model};
use crate::options::ModelOptions;
use crate::skeleton::{BoneList, FlatBone};
use crate::source::{SceneSnapshot, SceneSource};

pub use materials::{MaterialEntry, MaterialTable};
pub use skinning::{gather_bone_weights, BoneInfluences};
pub use weld::{weld_meshes, VertexRecord, WeldedMesh};

/// Output material with its slice of the index buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMaterial {
    pub name: String,
    pub color: [f32; 3],
    pub indices: Vec<u32>,
}

/// Result of in-memory model conversion
///
/// Optional attribute arrays are empty when their attribute is not exported.
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    pub attrib_mask: u32,
    /// World space, engine coordinates
    pub positions: Vec<Vec3>,
    /// Packed UV words (0 for vertices without UV)
    pub tex_coords: Vec<u32>,
    /// Packed 10-10-10 normals
    pub normals: Vec<u32>,
    pub influences: Vec<BoneInfluences>,
    /// Packed 10-10-10-2 tangents
    pub tangents: Vec<u32>,
    pub materials: Vec<ModelMaterial>,
    pub bones: Vec<FlatBone>,
}

impl ConvertedModel {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.materials.iter().map(|m| m.indices.len()).sum()
    }

    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::for_vertex_count(self.vertex_count())
    }
}

/// Convert a direction out of object space into engine space
#[inline]
fn world_direction(world: &Mat4, v: Vec3) -> Vec3 {
    to_engine(world.transform_vector3(v))
}

/// Convert every mesh of a scene to in-memory model data
pub fn convert_model_to_memory<S: SceneSource>(
    scene: &S,
    options: &ModelOptions,
) -> ExportResult<ConvertedModel> {
    options.validate()?;

    let meshes: Vec<_> = scene.meshes().collect();
    if options.tex_coords {
        for entry in meshes.iter().filter(|m| !m.mesh.has_uv_layer()) {
            tracing::warn!(
                "Object '{}' has no UV layer, its texture coordinates are written as zero",
                entry.object.name
            );
        }
    }

    let table = MaterialTable::build(scene.materials());
    let welded = weld_meshes(&meshes, &table, options)?;
    tracing::debug!(
        "Welded {} source vertices into {} ({} split off)",
        welded.original_count,
        welded.vertices.len(),
        welded.derived_count()
    );
    let worlds: Vec<Mat4> = meshes.iter().map(|m| m.object.world()).collect();

    let positions = welded
        .vertices
        .iter()
        .map(|v| to_engine(worlds[v.object].transform_point3(v.position)))
        .collect();

    let normals = welded
        .vertices
        .iter()
        .map(|v| {
            let normal = v.normal.unwrap_or(Vec3::ZERO);
            pack_direction_10_10_10(world_direction(&worlds[v.object], normal))
        })
        .collect();

    let tex_coords = if options.tex_coords {
        welded.vertices.iter().map(|v| pack_uv_word(v.uv)).collect()
    } else {
        Vec::new()
    };

    let tangents = if options.tangents {
        welded
            .vertices
            .iter()
            .map(|v| {
                let tangent = world_direction(&worlds[v.object], v.tangent);
                pack_tangent_10_10_10_2(tangent, v.bitangent_sign)
            })
            .collect()
    } else {
        Vec::new()
    };

    let (influences, bones) = if options.bones {
        let bones = BoneList::collect(scene);
        let influences = gather_bone_weights(&meshes, &welded, &bones);
        (influences, bones.into_bones())
    } else {
        (Vec::new(), Vec::new())
    };

    let materials = table
        .entries()
        .iter()
        .zip(welded.index_lists)
        .map(|(entry, indices)| ModelMaterial {
            name: entry.name.clone(),
            color: [entry.color[0], entry.color[1], entry.color[2]],
            indices,
        })
        .collect();

    Ok(ConvertedModel {
        attrib_mask: options.attrib_mask(),
        positions,
        tex_coords,
        normals,
        influences,
        tangents,
        materials,
        bones,
    })
}

/// Encode a converted model into file bytes
pub fn encode_model(model: &ConvertedModel) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_model(&mut bytes, model)?;
    Ok(bytes)
}

/// Convert a scene snapshot to a .model file
pub fn convert_model(input: &Path, output: &Path, options: &ModelOptions) -> Result<()> {
    let scene = SceneSnapshot::load(input)?;
    let model = convert_model_to_memory(&scene, options)
        .with_context(|| format!("Failed to convert model: {:?}", input))?;
    let bytes = encode_model(&model)?;
    write_atomic(output, &bytes)?;

    tracing::info!(
        "Converted model: {} vertices, {} indices ({:?}), {} materials, {} bones",
        model.vertex_count(),
        model.index_count(),
        model.index_width(),
        model.materials.len(),
        model.bones.len()
    );

    Ok(())
}
