//! Read back exported files
//!
//! Identifies a file by its magic number, checks the header and walks the
//! body far enough to report its counts.

use anyhow::{bail, Context, Result};
use model_common::{
    AnimationHeader, BinarySerializable, ByteReader, IndexWidth, ModelHeader, SceneHeader,
    ANIMATION_MAGIC, MODEL_MAGIC, SCENE_MAGIC,
};
use std::fmt;
use std::path::Path;

/// Counts decoded from an exported file
#[derive(Debug, Clone, PartialEq)]
pub enum FileSummary {
    Model {
        header: ModelHeader,
        materials: Vec<String>,
        bones: Vec<String>,
    },
    Scene {
        header: SceneHeader,
        assets: Vec<String>,
        object_count: u32,
    },
    Animation {
        header: AnimationHeader,
        bones: Vec<String>,
    },
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSummary::Model {
                header,
                materials,
                bones,
            } => write!(
                f,
                "model: {} vertices, {} indices, attribs {:#09b}, materials {:?}, {} bones",
                header.vertex_count,
                header.index_count,
                header.attrib_mask,
                materials,
                bones.len()
            ),
            FileSummary::Scene {
                assets,
                object_count,
                ..
            } => write!(f, "scene: assets {:?}, {} objects", assets, object_count),
            FileSummary::Animation { header, bones } => write!(
                f,
                "animation: {} frames at {} us, animated bones {:?}",
                header.frame_count, header.frame_duration_us, bones
            ),
        }
    }
}

fn read_header<H: BinarySerializable>(bytes: &[u8], reader: &mut ByteReader<'_>) -> Result<H> {
    let header = H::deserialize(bytes).context("Truncated header")?;
    reader.read_bytes(H::SIZE)?;
    Ok(header)
}

fn read_strings(reader: &mut ByteReader<'_>, count: u32) -> Result<Vec<String>> {
    (0..count)
        .map(|_| -> Result<String> { Ok(reader.read_string()?) })
        .collect()
}

fn describe_model(bytes: &[u8]) -> Result<FileSummary> {
    let mut r = ByteReader::new(bytes);
    let header: ModelHeader = read_header(bytes, &mut r)?;
    let vertices = header.vertex_count as usize;

    let per_vertex = model_common::vertex_attribute_size(header.attrib_mask);
    let index_bytes =
        IndexWidth::for_vertex_count(vertices).encoded_len(header.index_count as usize);
    r.read_bytes(vertices * per_vertex + index_bytes)
        .context("Vertex or index data is truncated")?;

    // Counts come from the file, so nothing is preallocated from them
    let material_count = r.read_u32()?;
    let mut materials = Vec::new();
    for _ in 0..material_count {
        r.read_bytes(8 + 12)?; // index range, colour
        materials.push(r.read_string()?);
    }

    let bone_count = r.read_u32()?;
    let mut bones = Vec::new();
    for _ in 0..bone_count {
        r.read_bytes(12 + 12 + 4)?; // head, tail, parent
        bones.push(r.read_string()?);
    }

    Ok(FileSummary::Model {
        header,
        materials,
        bones,
    })
}

fn describe_scene(bytes: &[u8]) -> Result<FileSummary> {
    let mut r = ByteReader::new(bytes);
    let header: SceneHeader = read_header(bytes, &mut r)?;
    let _name_words = r.read_u32()?;
    let asset_count = r.read_u32()?;
    let assets = read_strings(&mut r, asset_count)?;

    let mesh_count = r.read_u32()? as usize;
    r.read_bytes(mesh_count * 8)?;
    let _texture_count = r.read_u32()?;
    let object_count = r.read_u32()?;

    Ok(FileSummary::Scene {
        header,
        assets,
        object_count,
    })
}

fn describe_animation(bytes: &[u8]) -> Result<FileSummary> {
    let mut r = ByteReader::new(bytes);
    let header: AnimationHeader = read_header(bytes, &mut r)?;
    let bones = read_strings(&mut r, header.animated_bone_count)?;
    if r.remaining() != header.matrix_data_size() {
        bail!(
            "Expected {} bytes of matrix data, found {}",
            header.matrix_data_size(),
            r.remaining()
        );
    }
    Ok(FileSummary::Animation { header, bones })
}

/// Decode the header and counts of an exported file
pub fn describe(bytes: &[u8]) -> Result<FileSummary> {
    let mut r = ByteReader::new(bytes);
    let magic = r
        .read_u32()
        .context("File is too short to hold a magic number")?;
    match magic {
        MODEL_MAGIC => describe_model(bytes),
        SCENE_MAGIC => describe_scene(bytes),
        ANIMATION_MAGIC => describe_animation(bytes),
        other => bail!("Unknown magic number: {:#010x}", other),
    }
}

/// Describe a file on disk
pub fn inspect_file(path: &Path) -> Result<FileSummary> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    describe(&bytes).with_context(|| format!("Failed to decode: {:?}", path))
}
