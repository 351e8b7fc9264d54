//! Animation converter (scene snapshot -> .anim)
//!
//! Samples every armature bone over the scene's frame range. Only bones whose
//! pose differs from their rest transform at some frame are written.

use anyhow::{Context, Result};
use glam::Mat4;
use model_common::{convert_matrix, frame_duration_micros};
use std::path::Path;

use crate::error::{ExportError, ExportResult};
use crate::formats::{write_animation, write_atomic};
use crate::source::{SceneSnapshot, SceneSource};

/// Per-element tolerance when comparing rest and pose transforms
pub const POSE_EPSILON: f32 = 1e-6;

/// A bone that moves during the clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedBone {
    pub name: String,
    /// Skinning matrix per frame: pose × inverse rest, engine coordinates
    pub pre_multiplied: Vec<Mat4>,
}

/// Result of in-memory animation conversion
#[derive(Debug, Clone)]
pub struct ConvertedAnimation {
    pub frame_count: u32,
    pub frame_duration_us: u32,
    /// Total bones sampled, animated or not
    pub sampled_bone_count: usize,
    pub bones: Vec<AnimatedBone>,
}

struct BoneTrack {
    name: String,
    animated: bool,
    pre_multiplied: Vec<Mat4>,
}

/// Sample the scene's armatures into an animation clip
pub fn convert_animation_to_memory<S: SceneSource>(scene: &S) -> ExportResult<ConvertedAnimation> {
    let range = scene.frame_range();
    let (start, end) = (*range.start(), *range.end());
    let frame_count = usize::try_from(i64::from(end) - i64::from(start) + 1)
        .ok()
        .filter(|&n| n > 0)
        .ok_or(ExportError::NoFrames { start, end })?;

    let mut tracks = Vec::new();
    for entry in scene.armatures() {
        let world = entry.object.world();
        for bone in &entry.armature.bones {
            let edit = world * bone.rest();
            let inverse_edit = edit.inverse();

            let mut track = BoneTrack {
                name: bone.name.clone(),
                animated: false,
                pre_multiplied: Vec::with_capacity(frame_count),
            };
            for frame in 0..frame_count {
                let pose = world * bone.pose_at(frame);
                track.animated |= !edit.abs_diff_eq(pose, POSE_EPSILON);
                track.pre_multiplied.push(convert_matrix(pose * inverse_edit));
            }
            tracks.push(track);
        }
    }

    if tracks.is_empty() {
        return Err(ExportError::NoBones);
    }

    let sampled_bone_count = tracks.len();
    let bones = tracks
        .into_iter()
        .filter(|t| t.animated)
        .map(|t| AnimatedBone {
            name: t.name,
            pre_multiplied: t.pre_multiplied,
        })
        .collect();

    Ok(ConvertedAnimation {
        frame_count: frame_count as u32,
        frame_duration_us: frame_duration_micros(scene.fps()),
        sampled_bone_count,
        bones,
    })
}

/// Encode a converted animation into file bytes
pub fn encode_animation(animation: &ConvertedAnimation) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_animation(&mut bytes, animation)?;
    Ok(bytes)
}

/// Convert a scene snapshot to a .anim file
pub fn convert_animation(input: &Path, output: &Path) -> Result<()> {
    let scene = SceneSnapshot::load(input)?;
    let animation = convert_animation_to_memory(&scene)
        .with_context(|| format!("Failed to convert animation: {:?}", input))?;
    let bytes = encode_animation(&animation)?;
    write_atomic(output, &bytes)?;

    tracing::info!(
        "Converted animation: {} frames at {} us, {} of {} bones animated",
        animation.frame_count,
        animation.frame_duration_us,
        animation.bones.len(),
        animation.sampled_bone_count
    );

    Ok(())
}
