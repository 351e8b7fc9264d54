//! Integration tests for model-export
//!
//! Tests the full pipeline: build scene snapshot -> convert -> parse output


use glam::{Mat4, Vec3};
use model_common::{
    tangent_sign, unpack_direction_10_10_10, AnimationHeader, ByteReader, IndexWidth,
    ModelHeader, SceneHeader, ATTRIB_BONE_INDICES, ATTRIB_BONE_WEIGHTS, ATTRIB_TANGENT,
    ATTRIB_TEXCOORD, FIXED_NAME_LEN,
};
use model_export::animation::{convert_animation_to_memory, encode_animation};
use model_export::inspect::{describe, FileSummary};
use model_export::mesh::{convert_model_to_memory, encode_model};
use model_export::scene::{convert_scene_to_memory, encode_scene};
use model_export::{ExportError, ModelOptions, SceneOptions};
use std::path::Path;
use tempfile::tempdir;

// ============================================================================
// Model file reader
// ============================================================================

struct ParsedMaterial {
    start: u32,
    count: u32,
    color: Vec3,
    name: String,
}

struct ParsedBone {
    head: Vec3,
    tail: Vec3,
    parent: i32,
    name: String,
}

struct ParsedModel {
    header: ModelHeader,
    positions: Vec<Vec3>,
    tex_coords: Vec<u32>,
    normals: Vec<u32>,
    bone_indices: Vec<[u8; 4]>,
    bone_weights: Vec<[u8; 4]>,
    tangents: Vec<u32>,
    indices: Vec<u32>,
    materials: Vec<ParsedMaterial>,
    bones: Vec<ParsedBone>,
}

fn read_words(r: &mut ByteReader<'_>, n: usize) -> Vec<u32> {
    (0..n).map(|_| r.read_u32().unwrap()).collect()
}

fn read_quads(r: &mut ByteReader<'_>, n: usize) -> Vec<[u8; 4]> {
    (0..n)
        .map(|_| r.read_bytes(4).unwrap().try_into().unwrap())
        .collect()
}

fn parse_model(data: &[u8]) -> ParsedModel {
    let header = ModelHeader::from_bytes(data).expect("Invalid model header");
    assert_eq!(header.interleaved, 0);
    let mut r = ByteReader::new(&data[ModelHeader::SIZE..]);
    let n = header.vertex_count as usize;

    let positions = (0..n).map(|_| r.read_vec3().unwrap()).collect();
    let tex_coords = if header.has(ATTRIB_TEXCOORD) {
        read_words(&mut r, n)
    } else {
        Vec::new()
    };
    let normals = read_words(&mut r, n);
    let bone_indices = if header.has(ATTRIB_BONE_INDICES) {
        read_quads(&mut r, n)
    } else {
        Vec::new()
    };
    let bone_weights = if header.has(ATTRIB_BONE_WEIGHTS) {
        read_quads(&mut r, n)
    } else {
        Vec::new()
    };
    let tangents = if header.has(ATTRIB_TANGENT) {
        read_words(&mut r, n)
    } else {
        Vec::new()
    };

    let index_count = header.index_count as usize;
    let indices = match IndexWidth::for_vertex_count(n) {
        IndexWidth::U16 => {
            let indices = (0..index_count)
                .map(|_| r.read_u16().unwrap() as u32)
                .collect();
            if index_count % 2 == 1 {
                assert_eq!(r.read_u16().unwrap(), 0, "Pad word should be zero");
            }
            indices
        }
        IndexWidth::U32 => read_words(&mut r, index_count),
    };

    let material_count = r.read_u32().unwrap();
    let materials = (0..material_count)
        .map(|_| ParsedMaterial {
            start: r.read_u32().unwrap(),
            count: r.read_u32().unwrap(),
            color: r.read_vec3().unwrap(),
            name: r.read_string().unwrap(),
        })
        .collect();

    let bone_count = r.read_u32().unwrap();
    let bones = (0..bone_count)
        .map(|_| ParsedBone {
            head: r.read_vec3().unwrap(),
            tail: r.read_vec3().unwrap(),
            parent: r.read_i32().unwrap(),
            name: r.read_string().unwrap(),
        })
        .collect();

    assert_eq!(r.remaining(), 0, "Trailing bytes after bone list");

    ParsedModel {
        header,
        positions,
        tex_coords,
        normals,
        bone_indices,
        bone_weights,
        tangents,
        indices,
        materials,
        bones,
    }
}

fn model_bytes(scene: &model_export::SceneSnapshot, options: &ModelOptions) -> Vec<u8> {
    let model = convert_model_to_memory(scene, options).expect("Conversion failed");
    encode_model(&model).expect("Encoding failed")
}

// ============================================================================
// Model tests
// ============================================================================

#[test]
fn test_flat_shaded_cube() {
    let options = ModelOptions {
        bones: false,
        flat_shading: true,
        ..ModelOptions::default()
    };
    let model = parse_model(&model_bytes(&scene_fixtures::cube_scene(), &options));

    assert_eq!(model.header.vertex_count, 24);
    assert_eq!(model.header.index_count, 36);
    assert!(!model.header.has(ATTRIB_BONE_INDICES));
    assert_eq!(model.indices.len(), 36);
    assert!(model.indices.iter().all(|&i| i < 24));
    assert!(model.bones.is_empty());

    assert_eq!(model.materials.len(), 1);
    assert_eq!(model.materials[0].name, "default");
    assert_eq!((model.materials[0].start, model.materials[0].count), (0, 36));

    // Corners of a triangle share the face normal, which is axis aligned
    for tri in model.indices.chunks(3) {
        let normals: Vec<Vec3> = tri
            .iter()
            .map(|&i| unpack_direction_10_10_10(model.normals[i as usize]))
            .collect();
        assert_eq!(normals[0], normals[1]);
        assert_eq!(normals[1], normals[2]);
        assert!((normals[0].length() - 1.0).abs() < 0.01);
    }

    // Z-up cube: top face (+Z) ends up facing +Y
    let top = model
        .normals
        .iter()
        .map(|&n| unpack_direction_10_10_10(n))
        .filter(|n| (*n - Vec3::Y).length() < 0.01)
        .count();
    assert_eq!(top, 4);

    for tangent in &model.tangents {
        assert_eq!(tangent_sign(*tangent), 1.0);
    }
    assert_eq!(model.tex_coords.len(), 24);
    assert_eq!(model.positions.len(), 24);
}

#[test]
fn test_shared_material_color_merges() {
    let model = parse_model(&model_bytes(
        &scene_fixtures::shared_material_scene(),
        &ModelOptions::default(),
    ));

    // GreyA and GreyB collapse; Red stays as an unused entry
    assert_eq!(model.materials.len(), 2);
    let grey = &model.materials[0];
    assert_eq!(grey.name, "GreyA");
    assert_eq!(grey.color, Vec3::splat(0.5));
    assert_eq!((grey.start, grey.count), (0, 6));
    assert_eq!(&model.indices[..6], &[0, 1, 2, 3, 4, 5]);

    let red = &model.materials[1];
    assert_eq!((red.start, red.count), (6, 0));

    // Even index count, so no pad word
    assert_eq!(model.header.index_count, 6);

    // Second object is offset by its world transform
    assert_eq!(model.positions[3], Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_skinned_strip() {
    let model = parse_model(&model_bytes(
        &scene_fixtures::skinned_scene(),
        &ModelOptions::default(),
    ));

    assert!(model.header.has(ATTRIB_BONE_INDICES));
    assert!(model.header.has(ATTRIB_BONE_WEIGHTS));
    assert_eq!(model.header.vertex_count, 8);
    assert_eq!(model.bone_indices.len(), 8);

    assert_eq!(model.bone_indices[0], [0, 0, 0, 0]);
    assert_eq!(model.bone_weights[0], [255, 0, 0, 0]);
    assert_eq!(model.bone_indices[2], [0, 1, 0, 0]);
    assert_eq!(model.bone_weights[2], [127, 127, 0, 0]);
    assert_eq!(model.bone_indices[4], [1, 0, 0, 0]);

    // Vertices split at the UV seam keep the original's influences
    assert_eq!(model.bone_indices[6], model.bone_indices[2]);
    assert_eq!(model.bone_weights[7], model.bone_weights[3]);
    assert_eq!(model.positions[6], model.positions[2]);

    assert_eq!(model.bones.len(), 2);
    assert_eq!(model.bones[0].name, "Root");
    assert_eq!(model.bones[0].parent, -1);
    assert_eq!(model.bones[0].head, Vec3::ZERO);
    assert_eq!(model.bones[0].tail, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(model.bones[1].name, "Tip");
    assert_eq!(model.bones[1].parent, 0);
    assert_eq!(model.bones[1].head, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn test_odd_index_count_padding() {
    // One triangle: three u16 indices plus a zero pad word
    let mut scene = scene_fixtures::shared_material_scene();
    scene.objects.truncate(1);
    let bytes = model_bytes(&scene, &ModelOptions::default());
    let model = parse_model(&bytes);
    assert_eq!(model.header.index_count, 3);
    assert_eq!(bytes.len() % 4, 0);
}

#[test]
fn test_ngon_fails_without_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("pentagon.json");
    let output = dir.path().join("pentagon.model");
    scene_fixtures::write_snapshot(&scene_fixtures::pentagon_scene(), &input).unwrap();

    let err = convert_model_to_memory(
        &scene_fixtures::pentagon_scene(),
        &ModelOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedPolygon { corners: 5, .. }));

    let result = model_export::convert_model(&input, &output, &ModelOptions::default());
    assert!(result.is_err());
    assert!(!output.exists(), "No partial file should be written");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

// ============================================================================
// Scene tests
// ============================================================================

#[test]
fn test_scene_layout() {
    let scene = convert_scene_to_memory(&scene_fixtures::level_scene(), &SceneOptions::default())
        .expect("Conversion failed");
    let data = encode_scene(&scene).expect("Encoding failed");

    let header = SceneHeader::from_bytes(&data).expect("Invalid scene header");
    assert_eq!(header.ambient, [0.1, 0.1, 0.15]);

    let mut r = ByteReader::new(&data[SceneHeader::SIZE..]);
    let name_words = r.read_u32().unwrap();
    let asset_count = r.read_u32().unwrap();
    let start = r.position();
    let assets: Vec<String> = (0..asset_count).map(|_| r.read_string().unwrap()).collect();
    assert_eq!(
        assets,
        vec![
            "AVeryLongObjectNameIndeed.model.compressed",
            "Barn.model.compressed",
            "Fence.model.compressed",
        ]
    );
    assert_eq!(name_words as usize * 4, r.position() - start);

    assert_eq!(r.read_u32().unwrap(), 3);
    for i in 0..3 {
        assert_eq!(r.read_u32().unwrap(), i);
        assert_eq!(r.read_u32().unwrap(), 0);
    }
    assert_eq!(r.read_u32().unwrap(), 0); // textures

    // Four meshes, then three lights; the camera is not exported
    assert_eq!(r.read_u32().unwrap(), 7);
    let mut names = Vec::new();
    let mut mesh_indices = Vec::new();
    let mut light_types = Vec::new();
    for _ in 0..7 {
        names.push(r.read_fixed_name(FIXED_NAME_LEN).unwrap());
        assert_eq!(r.read_i32().unwrap(), -1);
        let has_mesh = r.read_u32().unwrap();
        let has_light = r.read_u32().unwrap();
        assert_eq!(r.read_u32().unwrap(), 0); // camera
        assert_eq!(r.read_u32().unwrap(), 0); // inherits parent transform
        let world = r.read_matrix().unwrap();

        if has_mesh == 1 {
            assert_eq!(has_light, 0);
            mesh_indices.push(r.read_u32().unwrap());
            for _ in 0..32 {
                assert_eq!(r.read_i32().unwrap(), -1);
                assert_eq!(r.read_i32().unwrap(), -1);
                assert_eq!(r.read_f32().unwrap(), 0.05);
                assert_eq!(r.read_f32().unwrap(), 1.0);
                assert_eq!(r.read_f32().unwrap(), 0.025);
                assert_eq!(r.read_u32().unwrap(), 1);
            }
        } else {
            assert_eq!(has_light, 1);
            let light_type = r.read_u32().unwrap();
            let color = r.read_vec3().unwrap();
            assert!((color - Vec3::new(10.0, 9.0, 8.0)).length() < 1e-4);
            assert_eq!(r.read_u32().unwrap(), 1);
            assert_eq!(r.read_f32().unwrap(), 0.05);
            assert_eq!(r.read_f32().unwrap(), 200.0);
            if light_type == 1 {
                assert!((r.read_f32().unwrap() - 45f32.to_radians()).abs() < 1e-6);
            }
            if names.last().map(String::as_str) == Some("Lamp") {
                // Authoring (0, 0, 4) is engine (0, 4, 0)
                let position = world.transform_point3(Vec3::ZERO);
                assert!((position - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
            }
            light_types.push(light_type);
        }
    }
    assert_eq!(r.remaining(), 0);

    assert_eq!(
        names,
        vec!["Barn", "Fence", "Fence.001", "AVeryLongObjectN", "Lamp", "Torch", "Sun"]
    );
    assert_eq!(mesh_indices, vec![1, 2, 2, 0]);
    assert_eq!(light_types, vec![0, 1, 2]);
}

#[test]
fn test_scene_mesh_world_matrix() {
    let scene = convert_scene_to_memory(&scene_fixtures::level_scene(), &SceneOptions::default())
        .unwrap();
    // Fence sits at authoring x = 5
    let fence = &scene.objects[1];
    assert_eq!(fence.name, "Fence");
    assert_eq!(fence.world.transform_point3(Vec3::ZERO), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(scene.objects[1].role, scene.objects[2].role);

    // Lights point down their local -Z, which is engine -Y after the fix-up
    let sun = scene.objects.last().unwrap();
    assert_eq!(sun.name, "Sun");
    let forward = sun.world.transform_vector3(Vec3::NEG_Z);
    assert!((forward - Vec3::NEG_Y).length() < 1e-5, "{:?}", forward);
}

// ============================================================================
// Animation tests
// ============================================================================

#[test]
fn test_animation_layout() {
    let clip = convert_animation_to_memory(&scene_fixtures::animated_scene())
        .expect("Conversion failed");
    let data = encode_animation(&clip).expect("Encoding failed");

    let header = AnimationHeader::from_bytes(&data).expect("Invalid animation header");
    assert_eq!(header.frame_count, scene_fixtures::FRAME_COUNT as u32);
    assert_eq!(header.frame_duration_us, 41_666);
    assert_eq!(header.animated_bone_count, 1);

    let mut r = ByteReader::new(&data[AnimationHeader::SIZE..]);
    assert_eq!(r.read_string().unwrap(), "Tip");
    assert_eq!(r.remaining(), header.matrix_data_size());

    for _ in 0..scene_fixtures::FRAME_COUNT {
        assert_eq!(r.read_matrix().unwrap(), Mat4::IDENTITY);
    }
    let first = r.read_matrix().unwrap();
    assert!(first.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    let second = r.read_matrix().unwrap();
    assert!(!second.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    // Rotation about the bone's head leaves the head in place (engine y = 1)
    let head = second.transform_point3(Vec3::new(0.0, 1.0, 0.0));
    assert!((head - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
}

// ============================================================================
// CLI tests
// ============================================================================

fn run(args: &[&str]) -> bool {
    std::process::Command::new(env!("CARGO_BIN_EXE_model-export"))
        .args(args)
        .status()
        .expect("Failed to run model-export")
        .success()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_model_scene_animation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("farm.json");
    scene_fixtures::write_snapshot(&scene_fixtures::skinned_scene(), &input).unwrap();

    assert!(run(&["model", path_arg(&input), "--flat-shading"]));
    let model = std::fs::read(dir.path().join("farm.model")).unwrap();
    assert!(matches!(describe(&model).unwrap(), FileSummary::Model { .. }));

    let scene_path = dir.path().join("out").join("farm.scene");
    assert!(run(&[
        "scene",
        path_arg(&input),
        "-o",
        path_arg(&scene_path),
        "--uncompressed-models",
    ]));
    match describe(&std::fs::read(&scene_path).unwrap()).unwrap() {
        FileSummary::Scene { assets, object_count, .. } => {
            assert_eq!(assets, vec!["Strip.model"]);
            assert_eq!(object_count, 1);
        }
        other => panic!("Unexpected summary: {}", other),
    }

    // Nothing in the skinned fixture moves
    assert!(run(&["animation", path_arg(&input)]));
    let anim = std::fs::read(dir.path().join("farm.anim")).unwrap();
    assert_eq!(AnimationHeader::from_bytes(&anim).unwrap().animated_bone_count, 0);

    assert!(run(&["inspect", path_arg(&dir.path().join("farm.model"))]));
}

#[test]
fn test_cli_rejects_tangents_without_tex_coords() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cube.json");
    scene_fixtures::write_snapshot(&scene_fixtures::cube_scene(), &input).unwrap();

    assert!(!run(&["model", path_arg(&input), "--no-tex-coords"]));
    assert!(!dir.path().join("cube.model").exists());
    assert!(run(&["model", path_arg(&input), "--no-tex-coords", "--no-tangents", "--no-bones"]));

    let model = parse_model(&std::fs::read(dir.path().join("cube.model")).unwrap());
    assert_eq!(model.header.vertex_count, 8);
    assert!(model.tex_coords.is_empty());
    assert!(model.tangents.is_empty());
}

#[test]
fn test_cli_build_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    scene_fixtures::write_snapshot(&scene_fixtures::level_scene(), &dir.path().join("level.json"))
        .unwrap();
    scene_fixtures::write_snapshot(&scene_fixtures::animated_scene(), &dir.path().join("rig.json"))
        .unwrap();

    let manifest = dir.path().join("export.toml");
    std::fs::write(
        &manifest,
        r#"
[output]
dir = "build"

[[model]]
name = "level"
source = "level.json"
bones = false

[[scene]]
name = "level"
source = "level.json"

[[animation]]
name = "swing"
source = "rig.json"
"#,
    )
    .unwrap();

    assert!(run(&["check", path_arg(&manifest)]));
    assert!(run(&["build", path_arg(&manifest)]));

    let build = dir.path().join("build");
    for file in ["level.model", "level.scene", "swing.anim"] {
        assert!(build.join(file).exists(), "{} should exist", file);
    }

    let anim = std::fs::read(build.join("swing.anim")).unwrap();
    let summary = describe(&anim).unwrap();
    assert_eq!(
        summary,
        FileSummary::Animation {
            header: AnimationHeader::new(4, 41_666, 1),
            bones: vec!["Tip".to_string()],
        }
    );
}

#[test]
fn test_cli_check_reports_missing_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = dir.path().join("export.toml");
    std::fs::write(&manifest, "[[model]]\nname = \"ghost\"\nsource = \"ghost.json\"\n").unwrap();
    assert!(!run(&["check", path_arg(&manifest)]));
}
