//! Authoring scene snapshot and the read-only scene interface
//!
//! The authoring tool dumps its scene graph to a JSON snapshot. Exporters
//! never walk the snapshot directly; they go through [`SceneSource`], whose
//! typed queries ([`SceneSource::meshes`], [`SceneSource::armatures`],
//! [`SceneSource::lights`]) replace probing objects for capabilities.
//!
//! Matrices are stored the way the authoring tool indexes them: row-major,
//! `m[row][col]`.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// 4x4 matrix as the authoring tool indexes it (`m[row][col]`)
pub type RowMatrix = [[f32; 4]; 4];

/// Identity in row-major form
pub const IDENTITY_ROWS: RowMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Convert a row-major authoring matrix to a glam matrix
#[inline]
pub fn matrix_from_rows(rows: &RowMatrix) -> Mat4 {
    Mat4::from_cols_array_2d(rows).transpose()
}

/// Convert a glam matrix to row-major authoring form
#[inline]
pub fn matrix_to_rows(m: &Mat4) -> RowMatrix {
    m.transpose().to_cols_array_2d()
}

fn identity_rows() -> RowMatrix {
    IDENTITY_ROWS
}

fn default_frame_end() -> i32 {
    1
}

fn default_fps() -> f32 {
    24.0
}

fn default_sign() -> f32 {
    1.0
}

fn default_energy() -> f32 {
    1.0
}

fn default_clip_start() -> f32 {
    0.05
}

fn default_cascade_distance() -> f32 {
    200.0
}

fn default_spot_size() -> f32 {
    45f32.to_radians()
}

// ============================================================================
// Snapshot types
// ============================================================================

/// Complete scene snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Global material list, in authoring order
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    /// Every object in authoring order
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub frame_start: i32,
    #[serde(default = "default_frame_end")]
    pub frame_end: i32,
    #[serde(default = "default_fps")]
    pub fps: f32,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            objects: Vec::new(),
            frame_start: 0,
            frame_end: default_frame_end(),
            fps: default_fps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub name: String,
    /// Viewport display colour (RGBA)
    pub diffuse_color: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default = "identity_rows")]
    pub world_matrix: RowMatrix,
    pub data: ObjectData,
}

impl SceneObject {
    pub fn world(&self) -> Mat4 {
        matrix_from_rows(&self.world_matrix)
    }
}

/// Object payload, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectData {
    Mesh(MeshData),
    Armature(ArmatureData),
    Light(LightData),
    Camera,
    Empty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub polygons: Vec<Polygon>,
    /// Material slots: index into the global material list
    #[serde(default)]
    pub materials: Vec<usize>,
    #[serde(default)]
    pub vertex_groups: Vec<VertexGroup>,
}

impl MeshData {
    /// Whether the mesh has an active UV layer
    pub fn has_uv_layer(&self) -> bool {
        self.polygons
            .iter()
            .any(|p| p.loops.iter().any(|l| l.uv.is_some()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MeshVertex {
    pub co: [f32; 3],
    #[serde(default)]
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Mesh-local vertex indices, one per corner
    pub vertices: Vec<u32>,
    /// Face normal
    #[serde(default)]
    pub normal: [f32; 3],
    /// Material slot on the owning mesh
    #[serde(default)]
    pub material_index: usize,
    /// Per-corner data, parallel to `vertices`
    #[serde(default)]
    pub loops: Vec<LoopData>,
}

impl Polygon {
    /// Tangent and bitangent multiplier of the face (taken from its first corner)
    pub fn face_tangent(&self) -> (Vec3, f32) {
        self.loops
            .first()
            .map(|l| (Vec3::from(l.tangent), l.bitangent_sign))
            .unwrap_or((Vec3::ZERO, 1.0))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopData {
    #[serde(default)]
    pub uv: Option<[f32; 2]>,
    #[serde(default)]
    pub tangent: [f32; 3],
    #[serde(default = "default_sign")]
    pub bitangent_sign: f32,
}

impl Default for LoopData {
    fn default() -> Self {
        Self {
            uv: None,
            tangent: [0.0; 3],
            bitangent_sign: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexGroup {
    /// Name of the bone this group binds to
    pub name: String,
    /// Mesh-local vertex index -> weight
    #[serde(default)]
    pub weights: HashMap<u32, f32>,
}

impl VertexGroup {
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmatureData {
    pub bones: Vec<BoneDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Rest head position, armature space
    pub head_local: [f32; 3],
    /// Rest tail position, armature space
    pub tail_local: [f32; 3],
    /// Rest transform, armature space
    #[serde(default = "identity_rows")]
    pub matrix_local: RowMatrix,
    /// Pose transform per sampled frame, armature space
    #[serde(default)]
    pub pose: Vec<RowMatrix>,
}

impl BoneDef {
    pub fn rest(&self) -> Mat4 {
        matrix_from_rows(&self.matrix_local)
    }

    /// Pose transform at frame offset `frame` (0 = first frame of the range)
    ///
    /// Frames without pose data hold the rest transform.
    pub fn pose_at(&self, frame: usize) -> Mat4 {
        self.pose
            .get(frame)
            .map(matrix_from_rows)
            .unwrap_or_else(|| self.rest())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Point,
    Spot,
    Sun,
    Area,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightData {
    pub light_type: LightKind,
    pub color: [f32; 3],
    #[serde(default = "default_energy")]
    pub energy: f32,
    #[serde(default = "default_clip_start")]
    pub shadow_clip_start: f32,
    #[serde(default = "default_cascade_distance")]
    pub shadow_cascade_max_distance: f32,
    /// Spot cone angle in radians
    #[serde(default = "default_spot_size")]
    pub spot_size: f32,
}

impl SceneSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene snapshot: {:?}", path))?;
        let snapshot: SceneSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene snapshot: {:?}", path))?;
        Ok(snapshot)
    }

    /// Write a snapshot as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to encode scene snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write scene snapshot: {:?}", path))?;
        Ok(())
    }
}

// ============================================================================
// Scene interface
// ============================================================================

/// Mesh-bearing object
#[derive(Debug, Clone, Copy)]
pub struct MeshObject<'a> {
    pub object: &'a SceneObject,
    pub mesh: &'a MeshData,
}

/// Armature-bearing object
#[derive(Debug, Clone, Copy)]
pub struct ArmatureObject<'a> {
    pub object: &'a SceneObject,
    pub armature: &'a ArmatureData,
}

/// Light object
#[derive(Debug, Clone, Copy)]
pub struct LightObject<'a> {
    pub object: &'a SceneObject,
    pub light: &'a LightData,
}

/// Read-only view of an authoring scene
pub trait SceneSource {
    /// Global material list
    fn materials(&self) -> &[MaterialDef];

    /// Every object, in authoring order
    fn objects(&self) -> &[SceneObject];

    /// Inclusive frame range of the scene's animation
    fn frame_range(&self) -> RangeInclusive<i32>;

    /// Playback rate in frames per second
    fn fps(&self) -> f32;

    fn meshes(&self) -> impl Iterator<Item = MeshObject<'_>> + '_ {
        self.objects().iter().filter_map(|object| match &object.data {
            ObjectData::Mesh(mesh) => Some(MeshObject { object, mesh }),
            _ => None,
        })
    }

    fn armatures(&self) -> impl Iterator<Item = ArmatureObject<'_>> + '_ {
        self.objects().iter().filter_map(|object| match &object.data {
            ObjectData::Armature(armature) => Some(ArmatureObject { object, armature }),
            _ => None,
        })
    }

    fn lights(&self) -> impl Iterator<Item = LightObject<'_>> + '_ {
        self.objects().iter().filter_map(|object| match &object.data {
            ObjectData::Light(light) => Some(LightObject { object, light }),
            _ => None,
        })
    }
}

impl SceneSource for SceneSnapshot {
    fn materials(&self) -> &[MaterialDef] {
        &self.materials
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn frame_range(&self) -> RangeInclusive<i32> {
        self.frame_start..=self.frame_end
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
