//! Bone hierarchy flattening
//!
//! Bones of every armature in the scene are concatenated into one list, in
//! object order then bone order. Vertex groups and animation tracks refer to
//! bones by name; this list turns those names into indices.

use glam::Vec3;
use model_common::{to_engine, BONE_NOT_FOUND};

use crate::source::SceneSource;

/// Largest bone count a byte-sized bone index can address
pub const MAX_BONES: usize = BONE_NOT_FOUND as usize;

/// One bone of the flattened hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBone {
    pub name: String,
    /// Rest head, world space, engine coordinates
    pub head: Vec3,
    /// Rest tail, world space, engine coordinates
    pub tail: Vec3,
    /// Index of the parent in the same list
    pub parent: Option<usize>,
}

impl FlatBone {
    /// Parent index as written to file (`-1` for roots)
    pub fn parent_index(&self) -> i32 {
        self.parent.map_or(-1, |p| p as i32)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoneList {
    bones: Vec<FlatBone>,
}

impl BoneList {
    pub fn collect<S: SceneSource>(scene: &S) -> Self {
        let mut bones = Vec::new();

        for entry in scene.armatures() {
            let world = entry.object.world();
            let base = bones.len();
            let armature_bones = &entry.armature.bones;

            for bone in armature_bones {
                let parent = bone.parent.as_deref().and_then(|parent| {
                    let found = armature_bones.iter().position(|b| b.name == parent);
                    if found.is_none() {
                        tracing::warn!(
                            "Bone '{}' in '{}' has unknown parent '{}', treating as root",
                            bone.name,
                            entry.object.name,
                            parent
                        );
                    }
                    found.map(|local| base + local)
                });

                bones.push(FlatBone {
                    name: bone.name.clone(),
                    head: to_engine(world.transform_point3(Vec3::from(bone.head_local))),
                    tail: to_engine(world.transform_point3(Vec3::from(bone.tail_local))),
                    parent,
                });
            }
        }

        if bones.len() > MAX_BONES {
            tracing::warn!(
                "Scene has {} bones, but bone indices only address {} (index 255 is reserved)",
                bones.len(),
                MAX_BONES
            );
        }

        Self { bones }
    }

    pub fn bones(&self) -> &[FlatBone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Index of the first bone called `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn into_bones(self) -> Vec<FlatBone> {
        self.bones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        matrix_to_rows, ArmatureData, BoneDef, ObjectData, SceneObject, SceneSnapshot,
        IDENTITY_ROWS,
    };
    use glam::Mat4;

    fn bone(name: &str, parent: Option<&str>, head: [f32; 3], tail: [f32; 3]) -> BoneDef {
        BoneDef {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            head_local: head,
            tail_local: tail,
            matrix_local: IDENTITY_ROWS,
            pose: Vec::new(),
        }
    }

    fn armature(name: &str, world: Mat4, bones: Vec<BoneDef>) -> SceneObject {
        SceneObject {
            name: name.to_string(),
            world_matrix: matrix_to_rows(&world),
            data: ObjectData::Armature(ArmatureData { bones }),
        }
    }

    #[test]
    fn test_flatten_two_armatures() {
        let scene = SceneSnapshot {
            objects: vec![
                armature(
                    "RigA",
                    Mat4::IDENTITY,
                    vec![
                        bone("Hip", None, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
                        bone("Spine", Some("Hip"), [0.0, 0.0, 1.0], [0.0, 0.0, 2.0]),
                    ],
                ),
                armature(
                    "RigB",
                    Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
                    vec![
                        bone("Tail", Some("Root"), [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]),
                        bone("Root", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
                    ],
                ),
            ],
            ..SceneSnapshot::default()
        };

        let list = BoneList::collect(&scene);
        assert_eq!(list.len(), 4);
        assert_eq!(list.bones()[0].parent, None);
        assert_eq!(list.bones()[1].parent, Some(0));
        assert_eq!(list.bones()[2].parent, Some(3));
        assert_eq!(list.bones()[2].parent_index(), 3);
        assert_eq!(list.bones()[3].parent_index(), -1);

        // World transform then Z-up -> Y-up
        assert_eq!(list.bones()[1].tail, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(list.bones()[2].head, Vec3::new(10.0, 0.0, -1.0));

        assert_eq!(list.find("Root"), Some(3));
        assert_eq!(list.find("Missing"), None);
    }

    #[test]
    fn test_unknown_parent_is_root() {
        let scene = SceneSnapshot {
            objects: vec![armature(
                "Rig",
                Mat4::IDENTITY,
                vec![bone("Hand", Some("Arm"), [0.0; 3], [0.0, 0.0, 1.0])],
            )],
            ..SceneSnapshot::default()
        };
        let list = BoneList::collect(&scene);
        assert_eq!(list.bones()[0].parent, None);
    }
}
