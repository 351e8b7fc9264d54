//! Bone influence gathering

use model_common::{pack_bone_weights_unorm8, BONE_NOT_FOUND};

use super::weld::WeldedMesh;
use crate::skeleton::BoneList;
use crate::source::MeshObject;

/// Influences stored per vertex
pub const MAX_INFLUENCES: usize = 4;

/// Up to four (bone, weight) pairs of one vertex; unused slots are zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneInfluences {
    pub indices: [u8; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl BoneInfluences {
    pub fn packed_weights(&self) -> [u8; MAX_INFLUENCES] {
        pack_bone_weights_unorm8(self.weights)
    }
}

/// Byte written for a bone list index
///
/// Index 255 is reserved for [`BONE_NOT_FOUND`], so bones from 255 on are
/// unaddressable and share the sentinel. The skeleton warns when that happens.
pub fn bone_slot(bone: usize) -> u8 {
    u8::try_from(bone)
        .ok()
        .filter(|&b| b != BONE_NOT_FOUND)
        .unwrap_or(BONE_NOT_FOUND)
}

/// Collect bone influences for every welded vertex
///
/// Influences are taken in vertex group order, not by weight. Derived
/// vertices share the influences of the vertex they were split from.
pub fn gather_bone_weights(
    meshes: &[MeshObject<'_>],
    welded: &WeldedMesh,
    bones: &BoneList,
) -> Vec<BoneInfluences> {
    let mut influences = vec![BoneInfluences::default(); welded.vertices.len()];

    for (index, record) in welded.vertices[..welded.original_count].iter().enumerate() {
        let entry = &meshes[record.object];
        let target = &mut influences[index];
        let mut slot = 0;

        for group in &entry.mesh.vertex_groups {
            let Some(weight) = group.weight(record.local).filter(|&w| w > 0.0) else {
                continue;
            };

            target.indices[slot] = match bones.find(&group.name) {
                Some(bone) => bone_slot(bone),
                None => {
                    tracing::debug!(
                        "Vertex group '{}' of '{}' names no bone",
                        group.name,
                        entry.object.name
                    );
                    BONE_NOT_FOUND
                }
            };
            target.weights[slot] = weight;

            slot += 1;
            if slot == MAX_INFLUENCES {
                break;
            }
        }
    }

    // Derived records always follow the original they copy from
    for (index, record) in welded.vertices.iter().enumerate() {
        if record.is_derived(index as u32) {
            influences[index] = influences[record.source as usize];
        }
    }

    influences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::materials::MaterialTable;
    use crate::mesh::weld::weld_meshes;
    use crate::options::ModelOptions;
    use crate::source::{
        ArmatureData, BoneDef, LoopData, MeshData, MeshVertex, ObjectData, Polygon, SceneObject,
        SceneSnapshot, SceneSource, VertexGroup, IDENTITY_ROWS,
    };

    fn group(name: &str, weights: &[(u32, f32)]) -> VertexGroup {
        VertexGroup {
            name: name.to_string(),
            weights: weights.iter().copied().collect(),
        }
    }

    fn rig(names: &[&str]) -> SceneObject {
        SceneObject {
            name: "Rig".into(),
            world_matrix: IDENTITY_ROWS,
            data: ObjectData::Armature(ArmatureData {
                bones: names
                    .iter()
                    .map(|n| BoneDef {
                        name: n.to_string(),
                        parent: None,
                        head_local: [0.0; 3],
                        tail_local: [0.0, 0.0, 1.0],
                        matrix_local: IDENTITY_ROWS,
                        pose: Vec::new(),
                    })
                    .collect(),
            }),
        }
    }

    fn skinned_scene(groups: Vec<VertexGroup>) -> SceneSnapshot {
        let tri = |uv: [f32; 2]| Polygon {
            vertices: vec![0, 1, 2],
            normal: [0.0, 0.0, 1.0],
            material_index: 0,
            loops: vec![
                LoopData {
                    uv: Some(uv),
                    ..LoopData::default()
                },
                LoopData {
                    uv: Some([1.0, 0.0]),
                    ..LoopData::default()
                },
                LoopData {
                    uv: Some([0.0, 1.0]),
                    ..LoopData::default()
                },
            ],
        };
        SceneSnapshot {
            objects: vec![
                rig(&["A", "B", "C", "D", "E"]),
                SceneObject {
                    name: "Skin".into(),
                    world_matrix: IDENTITY_ROWS,
                    data: ObjectData::Mesh(MeshData {
                        vertices: vec![MeshVertex::default(); 3],
                        polygons: vec![tri([0.0, 0.0]), tri([0.5, 0.0])],
                        materials: vec![],
                        vertex_groups: groups,
                    }),
                },
            ],
            ..SceneSnapshot::default()
        }
    }

    fn gather(scene: &SceneSnapshot) -> Vec<BoneInfluences> {
        let meshes: Vec<_> = scene.meshes().collect();
        let materials = MaterialTable::build(scene.materials());
        let welded = weld_meshes(&meshes, &materials, &ModelOptions::default()).unwrap();
        gather_bone_weights(&meshes, &welded, &BoneList::collect(scene))
    }

    #[test]
    fn test_discovery_order_and_cap() {
        let scene = skinned_scene(vec![
            group("E", &[(0, 0.1)]),
            group("A", &[(0, 0.2)]),
            group("B", &[(0, 0.0), (1, 1.0)]),
            group("C", &[(0, 0.3)]),
            group("D", &[(0, 0.4)]),
        ]);
        let influences = gather(&scene);

        // Group B has zero weight on vertex 0, so E, A, C, D fill the four slots
        assert_eq!(influences[0].indices, [4, 0, 2, 3]);
        assert_eq!(influences[0].weights, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(influences[1].indices, [1, 0, 0, 0]);
        assert_eq!(influences[1].weights, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(influences[2], BoneInfluences::default());
    }

    #[test]
    fn test_derived_vertex_copies_source() {
        let scene = skinned_scene(vec![group("C", &[(0, 0.75)])]);
        let influences = gather(&scene);
        assert_eq!(influences.len(), 4);
        assert_eq!(influences[3], influences[0]);
        assert_eq!(influences[3].indices[0], 2);
    }

    #[test]
    fn test_reserved_bone_slot() {
        assert_eq!(bone_slot(0), 0);
        assert_eq!(bone_slot(254), 254);
        assert_eq!(bone_slot(255), BONE_NOT_FOUND);
        assert_eq!(bone_slot(300), BONE_NOT_FOUND);
    }

    #[test]
    fn test_unknown_bone_sentinel() {
        let scene = skinned_scene(vec![group("Ghost", &[(1, 0.5)])]);
        let influences = gather(&scene);
        assert_eq!(influences[1].indices[0], BONE_NOT_FOUND);
        assert_eq!(influences[1].weights[0], 0.5);
        assert_eq!(influences[1].packed_weights(), [127, 0, 0, 0]);
    }
}
