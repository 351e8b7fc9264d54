//! Material table
//!
//! Materials are merged by diffuse colour, not by name: two authoring
//! materials with the same RGBA colour become one output material, named
//! after the first of them.

use crate::source::{MaterialDef, MeshData, Polygon};

/// Material count above which the engine misbehaves (warning only)
pub const MAX_MATERIALS: usize = 8;

/// Name of the material created when the scene has none
pub const DEFAULT_MATERIAL_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialEntry {
    pub name: String,
    pub color: [f32; 4],
}

/// Deduplicated materials plus the global-index remapping
#[derive(Debug, Clone)]
pub struct MaterialTable {
    entries: Vec<MaterialEntry>,
    /// Global material index -> entry index
    mapping: Vec<usize>,
}

impl MaterialTable {
    pub fn build(materials: &[MaterialDef]) -> Self {
        let mut entries: Vec<MaterialEntry> = Vec::new();
        let mut mapping = Vec::with_capacity(materials.len());

        for material in materials {
            let index = match entries
                .iter()
                .position(|e| e.color == material.diffuse_color)
            {
                Some(existing) => existing,
                None => {
                    entries.push(MaterialEntry {
                        name: material.name.clone(),
                        color: material.diffuse_color,
                    });
                    entries.len() - 1
                }
            };
            mapping.push(index);
        }

        // Meshes without material slots use index 0, which must exist
        if entries.is_empty() {
            entries.push(MaterialEntry {
                name: DEFAULT_MATERIAL_NAME.to_string(),
                color: [1.0; 4],
            });
        }

        if entries.len() > MAX_MATERIALS {
            tracing::warn!(
                "Too many materials: {} after merging, maximum is {}",
                entries.len(),
                MAX_MATERIALS
            );
        }

        Self { entries, mapping }
    }

    pub fn entries(&self) -> &[MaterialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output material for a polygon, or `None` if its slot is invalid
    pub fn resolve(&self, mesh: &MeshData, polygon: &Polygon) -> Option<usize> {
        if mesh.materials.is_empty() {
            return Some(0);
        }
        mesh.materials
            .get(polygon.material_index)
            .and_then(|&global| self.mapping.get(global))
            .copied()
    }
}
