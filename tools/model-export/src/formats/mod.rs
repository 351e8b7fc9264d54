//! File assemblers for the engine's binary formats
//!
//! Layouts and header types live in `model_common::formats`; the functions
//! here walk converted data and emit each section in order. Every count field
//! is known before its section is written.

pub use model_common::formats::*;

use anyhow::{Context, Result};
use glam::Mat4;
use model_common::{IndexWidth, WriteBinary, FIXED_NAME_LEN};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::animation::ConvertedAnimation;
use crate::mesh::ConvertedModel;
use crate::scene::{ConvertedScene, ObjectRole};

fn count(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).with_context(|| format!("Too many {}: {}", what, n))
}

fn write_bool<W: Write>(w: &mut W, value: bool) -> Result<()> {
    w.write_u32(u32::from(value))?;
    Ok(())
}

/// Write a complete model file
pub fn write_model<W: Write>(w: &mut W, model: &ConvertedModel) -> Result<()> {
    let vertex_count = count(model.vertex_count(), "vertices")?;
    let index_count = count(model.index_count(), "indices")?;

    let header = ModelHeader::new(index_count, model.attrib_mask, vertex_count);
    w.write_all(&header.to_bytes())?;

    for position in &model.positions {
        w.write_vec3(*position)?;
    }
    if header.has(ATTRIB_TEXCOORD) {
        for &uv in &model.tex_coords {
            w.write_u32(uv)?;
        }
    }
    for &normal in &model.normals {
        w.write_u32(normal)?;
    }
    if header.has(ATTRIB_BONE_INDICES) {
        for influence in &model.influences {
            w.write_all(&influence.indices)?;
        }
    }
    if header.has(ATTRIB_BONE_WEIGHTS) {
        for influence in &model.influences {
            w.write_all(&influence.packed_weights())?;
        }
    }
    if header.has(ATTRIB_TANGENT) {
        for &tangent in &model.tangents {
            w.write_u32(tangent)?;
        }
    }

    let indices = model
        .materials
        .iter()
        .flat_map(|m| m.indices.iter().copied());
    match model.index_width() {
        IndexWidth::U16 => {
            for index in indices {
                // Vertex count is at most 65536, so every index fits
                w.write_u16(index as u16)?;
            }
            if index_count % 2 != 0 {
                w.write_u16(0)?;
            }
        }
        IndexWidth::U32 => {
            for index in indices {
                w.write_u32(index)?;
            }
        }
    }

    w.write_u32(count(model.materials.len(), "materials")?)?;
    let mut index_start = 0u32;
    for material in &model.materials {
        let len = count(material.indices.len(), "indices")?;
        w.write_u32(index_start)?;
        w.write_u32(len)?;
        for channel in material.color {
            w.write_f32(channel)?;
        }
        w.write_string(&material.name)
            .with_context(|| format!("Failed to write material '{}'", material.name))?;
        index_start += len;
    }

    w.write_u32(count(model.bones.len(), "bones")?)?;
    for bone in &model.bones {
        w.write_vec3(bone.head)?;
        w.write_vec3(bone.tail)?;
        w.write_i32(bone.parent_index())?;
        w.write_string(&bone.name)
            .with_context(|| format!("Failed to write bone '{}'", bone.name))?;
    }

    Ok(())
}

/// Write a complete scene file
pub fn write_scene<W: Write>(w: &mut W, scene: &ConvertedScene) -> Result<()> {
    w.write_all(&scene.header.to_bytes())?;

    let name_words: u32 = scene.assets.iter().map(|a| asset_name_words(a)).sum();
    w.write_u32(name_words)?;
    w.write_u32(count(scene.assets.len(), "assets")?)?;
    for asset in &scene.assets {
        w.write_string(asset)
            .with_context(|| format!("Failed to write asset name '{}'", asset))?;
    }

    w.write_u32(count(scene.mesh_count(), "meshes")?)?;
    for asset_index in 0..scene.mesh_count() as u32 {
        w.write_u32(asset_index)?;
        w.write_u32(0)?; // read-only
    }

    // Textures
    w.write_u32(0)?;

    w.write_u32(count(scene.objects.len(), "objects")?)?;
    for object in &scene.objects {
        w.write_fixed_name(&object.name, FIXED_NAME_LEN)?;
        w.write_i32(NO_PARENT)?;
        write_bool(w, matches!(object.role, ObjectRole::Mesh { .. }))?;
        write_bool(w, matches!(object.role, ObjectRole::Light(_)))?;
        write_bool(w, false)?; // camera
        write_bool(w, false)?; // inherits parent transform
        w.write_matrix(&object.world)?;

        match &object.role {
            ObjectRole::Mesh { mesh_index } => {
                w.write_u32(*mesh_index)?;
                for _ in 0..MATERIAL_SLOTS {
                    w.write_i32(NO_TEXTURE)?;
                    w.write_i32(NO_TEXTURE)?;
                    w.write_f32(scene.slots.specular_size)?;
                    w.write_f32(scene.slots.specular_intensity)?;
                    w.write_f32(scene.slots.specular_tint)?;
                    write_bool(w, scene.slots.flat_shading)?;
                }
            }
            ObjectRole::Light(light) => {
                w.write_u32(light.light_type as u32)?;
                w.write_vec3(light.color)?;
                write_bool(w, true)?; // cast shadows
                w.write_f32(light.shadow_near)?;
                w.write_f32(light.shadow_far)?;
                if let Some(angle) = light.spot_angle {
                    w.write_f32(angle)?;
                }
            }
        }
    }

    Ok(())
}

/// Write a complete animation file
///
/// The plain matrix section is reserved and always holds identity matrices.
pub fn write_animation<W: Write>(w: &mut W, animation: &ConvertedAnimation) -> Result<()> {
    let bone_count = count(animation.bones.len(), "animated bones")?;
    let header = AnimationHeader::new(
        animation.frame_count,
        animation.frame_duration_us,
        bone_count,
    );
    w.write_all(&header.to_bytes())?;

    for bone in &animation.bones {
        w.write_string(&bone.name)
            .with_context(|| format!("Failed to write bone '{}'", bone.name))?;
    }

    for _ in 0..animation.frame_count {
        for _ in &animation.bones {
            w.write_matrix(&Mat4::IDENTITY)?;
        }
    }

    for frame in 0..animation.frame_count as usize {
        for bone in &animation.bones {
            w.write_matrix(&bone.pre_multiplied[frame])?;
        }
    }

    Ok(())
}

/// Replace `path` with `bytes` in one step
///
/// The data goes to a temporary file next to the destination, which is then
/// renamed over it. A failed export never leaves a partial file behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write output: {:?}", path))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output: {:?}", path))?;

    Ok(())
}
