//! Bone Hierarchy Tests
//!
//! Tests for:
//! - Armature discovery from the first mesh with bones
//! - Matrix index assignment (bound bones first, then ancestors)
//! - Parent-before-child ordering and native child order
//! - Offset inheritance for unbound ancestors
//! - Meshes bound to a different armature
//! - Missing armature

mod common;

use glam::{Mat4, Vec2, Vec3};

use sinew::errors::SinewError;
use sinew::import::{ImportedScene, SceneBone, SceneMesh, VertexWeight};
use sinew::skeleton::{build_hierarchy, format_tree};

use common::skinned_scene;

fn names(bones: &[sinew::Bone]) -> Vec<&str> {
    bones.iter().map(|b| b.name.as_str()).collect()
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn armature_is_taken_from_first_bound_mesh() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    assert_eq!(Some(hierarchy.armature), scene.find_node("Armature"));
    assert_eq!(hierarchy.meshes, vec![0]);
}

#[test]
fn bound_bones_get_indices_before_ancestors() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();

    let index_of = |name: &str| hierarchy.matrix_index(scene.find_node(name).unwrap());
    // Mesh lists Head, Hips, Leg; Head's walk then finds Spine and Armature
    assert_eq!(index_of("Head"), Some(0));
    assert_eq!(index_of("Hips"), Some(1));
    assert_eq!(index_of("Leg"), Some(2));
    assert_eq!(index_of("Spine"), Some(3));
    assert_eq!(index_of("Armature"), Some(4));
    assert_eq!(index_of("Body"), None);
    assert_eq!(index_of("Scene"), None);
    assert_eq!(hierarchy.matrix_count, 5);
}

#[test]
fn unbound_ancestor_borrows_offset_of_discovering_bone() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    let spine = hierarchy.bones.iter().find(|b| b.name == "Spine").unwrap();
    let head = hierarchy.bones.iter().find(|b| b.name == "Head").unwrap();
    assert_eq!(spine.offset_matrix, head.offset_matrix);
}

// ============================================================================
// Build pass
// ============================================================================

#[test]
fn bones_are_preorder_in_native_child_order() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    assert_eq!(names(&hierarchy.bones), vec!["Armature", "Hips", "Spine", "Head", "Leg"]);

    let parents: Vec<Option<usize>> = hierarchy.bones.iter().map(|b| b.parent).collect();
    assert_eq!(parents, vec![None, Some(0), Some(1), Some(2), Some(1)]);
}

#[test]
fn every_parent_precedes_its_child() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    assert!(hierarchy.bones[0].is_root());
    for (index, bone) in hierarchy.bones.iter().enumerate().skip(1) {
        let parent = bone.parent.expect("only bone 0 is a root");
        assert!(parent < index, "bone {index} has parent {parent}");
    }
}

#[test]
fn relative_matrices_come_from_node_transforms() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    let hips = &hierarchy.bones[1];
    assert_eq!(hips.relative_matrix, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    assert_eq!(hips.matrix_index, 1);
}

#[test]
fn tree_dump_lists_every_bone() {
    let scene = skinned_scene();
    let hierarchy = build_hierarchy(&scene).unwrap();
    let tree = format_tree(&hierarchy.bones);
    assert_eq!(tree, "Armature -> -1\nLHips -> 0\n|LSpine -> 1\n||LHead -> 2\n|LLeg -> 1\n");
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn mesh_on_other_armature_is_ignored() {
    let mut scene = skinned_scene();
    let root = scene.root.unwrap();
    let other = scene.create_child(root, "OtherArmature", Mat4::IDENTITY);
    let tail = scene.create_child(other, "Tail", Mat4::IDENTITY);
    scene.meshes.push(SceneMesh {
        name: "tail".into(),
        positions: vec![Vec3::ZERO],
        normals: vec![Vec3::Z],
        uvs: vec![Vec2::ZERO],
        indices: vec![0, 0, 0],
        material: None,
        bones: vec![SceneBone {
            node: tail,
            armature: other,
            offset_matrix: Mat4::IDENTITY,
            weights: vec![VertexWeight { vertex: 0, weight: 1.0 }],
        }],
    });

    let hierarchy = build_hierarchy(&scene).unwrap();
    assert_eq!(hierarchy.meshes, vec![0]);
    assert_eq!(hierarchy.matrix_index(tail), None);
    assert_eq!(hierarchy.bones.len(), 5);
}

#[test]
fn boneless_meshes_before_the_first_bound_one_are_skipped() {
    let mut scene = ImportedScene::new();
    let root = scene.create_node("Scene", Mat4::IDENTITY);
    let armature = scene.create_child(root, "Rig", Mat4::IDENTITY);
    let bone = scene.create_child(armature, "Bone", Mat4::IDENTITY);
    scene.meshes.push(SceneMesh {
        name: "static".into(),
        ..SceneMesh::default()
    });
    scene.meshes.push(SceneMesh {
        name: "skinned".into(),
        positions: vec![Vec3::ZERO],
        bones: vec![SceneBone {
            node: bone,
            armature,
            offset_matrix: Mat4::IDENTITY,
            weights: Vec::new(),
        }],
        ..SceneMesh::default()
    });

    let hierarchy = build_hierarchy(&scene).unwrap();
    assert_eq!(hierarchy.armature, armature);
    assert_eq!(hierarchy.meshes, vec![1]);
    assert_eq!(names(&hierarchy.bones), vec!["Rig", "Bone"]);
}

#[test]
fn bone_shared_by_two_meshes_is_indexed_once() {
    let mut scene = skinned_scene();
    let mut copy = scene.meshes[0].clone();
    copy.name = "body_copy".into();
    copy.bones.reverse();
    scene.meshes.push(copy);

    let hierarchy = build_hierarchy(&scene).unwrap();
    assert_eq!(hierarchy.meshes, vec![0, 1]);
    assert_eq!(hierarchy.matrix_count, 5);
}

#[test]
fn no_bound_mesh_is_missing_armature() {
    let scene = common::static_scene();
    let err = build_hierarchy(&scene).unwrap_err();
    assert!(matches!(err, SinewError::MissingArmature));
}
