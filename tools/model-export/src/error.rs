//! Error types for export operations.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that abort an export.
///
/// Soft policy violations (too many materials, invalid material slots, unknown
/// bone names) are logged instead and never surface here.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Polygon with more than four corners.
    #[error(
        "object '{object}' polygon {polygon} has {corners} vertices: only triangles and \
         quadrilaterals are supported, triangulate the mesh"
    )]
    UnsupportedPolygon {
        /// Object owning the polygon.
        object: String,
        /// Polygon index within the mesh.
        polygon: usize,
        /// Number of corners found.
        corners: usize,
    },

    /// Polygon references a vertex the mesh does not have.
    #[error("object '{object}' polygon {polygon} references vertex {vertex} of {vertex_count}")]
    VertexOutOfRange {
        /// Object owning the polygon.
        object: String,
        /// Polygon index within the mesh.
        polygon: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Vertex array outgrew 32-bit indices.
    #[error("model has {0} vertices, more than 32-bit indices can address")]
    TooManyVertices(usize),

    /// Tangent export was requested without texture coordinates.
    #[error("exporting tangents requires exporting texture coordinates")]
    TangentsRequireTexCoords,

    /// Animation export found no armature bones.
    #[error("scene has no bones to animate")]
    NoBones,

    /// Frame range is empty.
    #[error("frame range {start}..={end} contains no frames")]
    NoFrames {
        /// First frame.
        start: i32,
        /// Last frame.
        end: i32,
    },
}
