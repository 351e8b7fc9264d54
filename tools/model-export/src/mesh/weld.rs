//! Vertex welding and index building
//!
//! Every mesh vertex starts as one record in a [`VertexArena`]. Each triangle
//! corner then either reuses a compatible record or spawns a derived one
//! holding the conflicting normal/UV. Records are addressed by their index in
//! the arena and never move, so indices handed out stay valid.

use glam::Vec3;
use hashbrown::HashMap;

use super::materials::MaterialTable;
use crate::error::{ExportError, ExportResult};
use crate::options::ModelOptions;
use crate::source::{MeshObject, Polygon};

/// Corner order used to split a quad along its 0-2 diagonal
const QUAD_CORNERS: [usize; 6] = [0, 1, 2, 2, 3, 0];
const TRIANGLE_CORNERS: [usize; 3] = [0, 1, 2];

/// One output vertex
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord {
    /// Index of the owning mesh object (in `SceneSource::meshes` order)
    pub object: usize,
    /// Mesh-local index of the source vertex
    pub local: u32,
    /// Arena index of the original record this one was derived from (itself for originals)
    pub source: u32,
    /// Object-space position
    pub position: Vec3,
    /// Object-space normal; unset under flat shading until a face assigns one
    pub normal: Option<Vec3>,
    /// Set once, never overwritten
    pub uv: Option<[f32; 2]>,
    /// Running tangent sum, averaged by [`VertexArena::average_tangents`]
    pub tangent: Vec3,
    pub tangent_count: u32,
    pub bitangent_sign: f32,
    /// Referenced by at least one face
    pub visited: bool,
}

impl VertexRecord {
    pub fn is_derived(&self, index: u32) -> bool {
        self.source != index
    }
}

/// Attributes of one triangle corner
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub face_normal: Vec3,
    pub uv: Option<[f32; 2]>,
    pub tangent: Vec3,
    pub bitangent_sign: f32,
}

/// Which attributes take part in welding decisions
#[derive(Debug, Clone, Copy)]
pub struct WeldRules {
    pub flat_shading: bool,
    pub tex_coords: bool,
}

impl From<&ModelOptions> for WeldRules {
    fn from(options: &ModelOptions) -> Self {
        Self {
            flat_shading: options.flat_shading,
            tex_coords: options.tex_coords,
        }
    }
}

impl WeldRules {
    fn accepts(self, record: &VertexRecord, corner: &Corner) -> bool {
        if self.flat_shading && record.normal != Some(corner.face_normal) {
            return false;
        }
        if !self.tex_coords || corner.uv.is_none() {
            return true;
        }
        match record.uv {
            None => true,
            Some(uv) => Some(uv) == corner.uv,
        }
    }

    fn absorb(self, record: &mut VertexRecord, corner: &Corner) {
        if self.tex_coords && record.uv.is_none() {
            record.uv = corner.uv;
        }
        record.tangent += corner.tangent;
        record.tangent_count += 1;
        record.bitangent_sign = corner.bitangent_sign;
        record.visited = true;
    }
}

/// Append-only vertex storage
#[derive(Debug, Default)]
pub struct VertexArena {
    records: Vec<VertexRecord>,
    /// Original index -> derived indices, in creation order
    derived: HashMap<u32, Vec<u32>>,
}

impl VertexArena {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VertexRecord] {
        &self.records
    }

    fn next_index(&self) -> ExportResult<u32> {
        u32::try_from(self.records.len())
            .map_err(|_| ExportError::TooManyVertices(self.records.len()))
    }

    /// Add a source mesh vertex
    pub fn push_original(
        &mut self,
        object: usize,
        local: u32,
        position: Vec3,
        normal: Option<Vec3>,
    ) -> ExportResult<u32> {
        let index = self.next_index()?;
        self.records.push(VertexRecord {
            object,
            local,
            source: index,
            position,
            normal,
            uv: None,
            tangent: Vec3::ZERO,
            tangent_count: 0,
            bitangent_sign: 1.0,
            visited: false,
        });
        Ok(index)
    }

    /// Resolve a corner against original record `original`
    ///
    /// The original is tried first, then the records already derived from it.
    /// Only when none of them fit is a new record spawned.
    pub fn weld(&mut self, original: u32, corner: &Corner, rules: WeldRules) -> ExportResult<u32> {
        let record = &mut self.records[original as usize];
        if rules.flat_shading && record.normal.is_none() {
            record.normal = Some(corner.face_normal);
        }
        record.visited = true;

        let derived = self
            .derived
            .get(&original)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for &candidate in std::iter::once(&original).chain(derived) {
            let record = &mut self.records[candidate as usize];
            if rules.accepts(record, corner) {
                rules.absorb(record, corner);
                return Ok(candidate);
            }
        }

        self.spawn(original, corner, rules)
    }

    fn spawn(&mut self, original: u32, corner: &Corner, rules: WeldRules) -> ExportResult<u32> {
        let index = self.next_index()?;
        let source = &self.records[original as usize];
        let record = VertexRecord {
            object: source.object,
            local: source.local,
            source: original,
            position: source.position,
            normal: if rules.flat_shading {
                Some(corner.face_normal)
            } else {
                source.normal
            },
            uv: if rules.tex_coords { corner.uv } else { None },
            tangent: corner.tangent,
            tangent_count: 1,
            bitangent_sign: corner.bitangent_sign,
            visited: true,
        };
        self.records.push(record);
        self.derived.entry(original).or_default().push(index);
        Ok(index)
    }

    /// Divide every tangent sum by its contribution count
    pub fn average_tangents(&mut self) {
        for record in &mut self.records {
            if record.tangent_count > 0 {
                record.tangent /= record.tangent_count as f32;
            }
        }
    }
}

/// Output of the welding pass
#[derive(Debug)]
pub struct WeldedMesh {
    pub vertices: Vec<VertexRecord>,
    /// Number of records that came straight from source vertices
    pub original_count: usize,
    /// Arena index of each object's first vertex
    pub object_offsets: Vec<u32>,
    /// Triangle indices per output material
    pub index_lists: Vec<Vec<u32>>,
}

impl WeldedMesh {
    pub fn index_count(&self) -> usize {
        self.index_lists.iter().map(Vec::len).sum()
    }

    pub fn derived_count(&self) -> usize {
        self.vertices.len() - self.original_count
    }
}

fn triangle_corners(polygon: &Polygon) -> &'static [usize] {
    if polygon.vertices.len() == 4 {
        &QUAD_CORNERS
    } else {
        &TRIANGLE_CORNERS
    }
}

/// Weld every mesh object into one vertex array with per-material index lists
///
/// Objects, polygons and corners are processed in order, so the output is
/// deterministic for a given scene.
pub fn weld_meshes(
    meshes: &[MeshObject<'_>],
    materials: &MaterialTable,
    options: &ModelOptions,
) -> ExportResult<WeldedMesh> {
    let rules = WeldRules::from(options);
    let mut arena = VertexArena::default();
    let mut object_offsets = Vec::with_capacity(meshes.len());

    for (object, entry) in meshes.iter().enumerate() {
        object_offsets.push(arena.next_index()?);
        for (local, vertex) in entry.mesh.vertices.iter().enumerate() {
            let normal = if options.flat_shading {
                None
            } else {
                Some(Vec3::from(vertex.normal))
            };
            arena.push_original(object, local as u32, Vec3::from(vertex.co), normal)?;
        }
    }
    let original_count = arena.len();

    let mut index_lists = vec![Vec::new(); materials.len()];

    for (object, entry) in meshes.iter().enumerate() {
        let offset = object_offsets[object];
        let vertex_count = entry.mesh.vertices.len();

        for (polygon_index, polygon) in entry.mesh.polygons.iter().enumerate() {
            let corners = polygon.vertices.len();
            if corners > 4 {
                return Err(ExportError::UnsupportedPolygon {
                    object: entry.object.name.clone(),
                    polygon: polygon_index,
                    corners,
                });
            }
            if corners < 3 {
                continue;
            }

            let Some(material) = materials.resolve(entry.mesh, polygon) else {
                tracing::warn!(
                    "Object '{}' polygon {} has invalid material slot {}, skipping",
                    entry.object.name,
                    polygon_index,
                    polygon.material_index
                );
                continue;
            };

            let (tangent, bitangent_sign) = polygon.face_tangent();
            let face_normal = Vec3::from(polygon.normal);

            for &corner_index in triangle_corners(polygon) {
                let vertex = polygon.vertices[corner_index];
                if vertex as usize >= vertex_count {
                    return Err(ExportError::VertexOutOfRange {
                        object: entry.object.name.clone(),
                        polygon: polygon_index,
                        vertex,
                        vertex_count,
                    });
                }

                let corner = Corner {
                    face_normal,
                    uv: polygon.loops.get(corner_index).and_then(|l| l.uv),
                    tangent,
                    bitangent_sign,
                };
                let index = arena.weld(offset + vertex, &corner, rules)?;
                index_lists[material].push(index);
            }
        }
    }

    arena.average_tangents();

    let unreferenced = arena.records().iter().filter(|r| !r.visited).count();
    if unreferenced > 0 {
        tracing::debug!("{} vertices are not referenced by any face", unreferenced);
    }

    Ok(WeldedMesh {
        vertices: arena.records,
        original_count,
        object_offsets,
        index_lists,
    })
}
