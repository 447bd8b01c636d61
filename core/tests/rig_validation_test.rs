//! End-to-end validation of small rigs through the public API

use glam::{Quat, Vec3};
use rigcheck_core::{
    check_rig, Edge, ElementRef, Influence, Joint, JointId, JointLabel, MalformedMeshError, Mesh,
    RigConfig, RigSnapshot, RuleEngine, RuleId, Severity, Side, Skeleton, SkinBinding,
    SnapshotError, SymmetryPlane, Transform, ValidationError, VertexWeights,
};
use smallvec::smallvec;

/// Closed cube made of quads, centered on the origin
fn cube() -> Mesh {
    let positions = vec![
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
    ];
    let faces = vec![
        smallvec![0, 3, 2, 1],
        smallvec![4, 5, 6, 7],
        smallvec![0, 1, 5, 4],
        smallvec![2, 3, 7, 6],
        smallvec![1, 2, 6, 5],
        smallvec![0, 4, 7, 3],
    ];
    Mesh::new(positions, faces)
}

fn labeled(name: &str, side: Side, kind: &str) -> Joint {
    Joint::new(name).with_label(JointLabel::new(side, kind))
}

/// hips -> l_hand / r_hand, all in bind pose
fn skeleton() -> Skeleton {
    Skeleton::new(vec![
        labeled("hips", Side::Center, "hips").with_bind_pose(Transform::IDENTITY),
        labeled("l_hand", Side::Left, "hand")
            .with_parent(JointId(0))
            .with_local(Transform::from_translation(Vec3::X))
            .with_bind_pose(Transform::from_translation(Vec3::X)),
        labeled("r_hand", Side::Right, "hand")
            .with_parent(JointId(0))
            .with_local(Transform::from_translation(-Vec3::X))
            .with_bind_pose(Transform::from_translation(-Vec3::X)),
    ])
    .unwrap()
}

fn rigid_skin(vertex_count: usize) -> SkinBinding {
    SkinBinding::new(vec![smallvec![Influence::new(JointId(0), 1.0)]; vertex_count])
}

fn clean_config() -> RigConfig {
    RigConfig::default()
}

#[test]
fn test_clean_cube_rig() {
    let mesh = cube().with_tweaks(vec![Vec3::ZERO; 8]);
    let report = check_rig(mesh, skeleton(), Some(rigid_skin(8)), &clean_config()).unwrap();
    assert!(report.findings().is_empty(), "{report}");
    assert_eq!(report.stats().edges, 12);
    assert!(report.is_clean());
}

#[test]
fn test_closed_mesh_edges_have_two_faces() {
    let snapshot = RigSnapshot::new(cube(), Skeleton::default(), None).unwrap();
    let geometry = snapshot.geometry();
    assert!(geometry.is_closed_manifold());
    for face in snapshot.mesh().faces() {
        for i in 0..face.len() {
            let edge = Edge::new(face[i], face[(i + 1) % face.len()]);
            assert_eq!(geometry.edge_face_count(edge), 2);
        }
    }
}

#[test]
fn test_fin_face_is_flagged() {
    let mut mesh = cube();
    let mut positions = mesh.positions().to_vec();
    positions.push(Vec3::new(0.0, -2.0, -2.0));
    let mut faces = mesh.faces().to_vec();
    // Third face on edge 0-1
    faces.push(smallvec![0, 1, 8]);
    mesh = Mesh::new(positions, faces);

    let report = check_rig(mesh, Skeleton::default(), None, &clean_config()).unwrap();
    let manifold: Vec<_> = report.for_rule(RuleId::Manifold).collect();
    assert_eq!(manifold.len(), 1);
    assert_eq!(manifold[0].severity, Severity::Error);
    assert_eq!(manifold[0].message, "non-manifold edge: 0-1 (3 faces)");
    assert_eq!(manifold[0].elements[0], ElementRef::Edge { a: 0, b: 1 });
}

#[test]
fn test_asymmetric_vertex() {
    let mesh = Mesh::from_triangles(
        vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
        &[[0, 1, 2]],
    );
    let report = check_rig(mesh, Skeleton::default(), None, &clean_config()).unwrap();
    let messages: Vec<&str> = report
        .for_rule(RuleId::MeshSymmetry)
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(messages, vec!["asymmetric vertex: 0"]);
}

#[test]
fn test_symmetry_plane_is_configurable() {
    // Symmetric across XZ only
    let mesh = Mesh::from_triangles(
        vec![Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.5, -1.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        &[[0, 1, 2]],
    );
    let config = RigConfig {
        symmetry_plane: SymmetryPlane::Xz,
        ..clean_config()
    };
    let report = check_rig(mesh.clone(), Skeleton::default(), None, &config).unwrap();
    assert_eq!(report.for_rule(RuleId::MeshSymmetry).count(), 0);

    let report = check_rig(mesh, Skeleton::default(), None, &clean_config()).unwrap();
    assert_eq!(report.for_rule(RuleId::MeshSymmetry).count(), 3);
}

#[test]
fn test_five_influences() {
    let joints: Vec<Joint> = (0..5)
        .map(|i| labeled(&format!("spine{i}"), Side::Center, &format!("spine{i}")))
        .collect();
    let five: VertexWeights = (0..5).map(|i| Influence::new(JointId(i), 0.2)).collect();
    let mut weights = vec![smallvec![Influence::new(JointId(0), 1.0)]; 8];
    weights[3] = five;
    let skin = SkinBinding::new(weights);

    let flagged = |max_influences| {
        let config = RigConfig {
            max_influences,
            ..clean_config()
        };
        check_rig(cube(), Skeleton::new(joints.clone()).unwrap(), Some(skin.clone()), &config)
            .unwrap()
            .for_rule(RuleId::MaxInfluences)
            .filter(|f| f.severity == Severity::Error)
            .count()
    };
    assert_eq!(flagged(4), 1);
    assert_eq!(flagged(0), 0);
}

#[test]
fn test_pose_deviation_yields_one_finding() {
    let mut joints = skeleton().joints().to_vec();
    joints[1].local = Transform::new(Vec3::X, Quat::from_rotation_y(0.5), Vec3::ONE);
    let skeleton = Skeleton::new(joints).unwrap();

    let report = check_rig(cube(), skeleton, None, &clean_config()).unwrap();
    let pose: Vec<_> = report.for_rule(RuleId::BindPose).collect();
    assert_eq!(pose.len(), 1);
    assert!(pose[0].references_joint(JointId(1)));
    assert_eq!(report.for_joint(JointId(1)).filter(|f| f.rule == RuleId::BindPose).count(), 1);
}

#[test]
fn test_duplicate_labels_are_errors() {
    let skeleton = Skeleton::new(vec![
        labeled("hips", Side::Center, "hips"),
        labeled("l_hand", Side::Left, "hand").with_parent(JointId(0)),
        labeled("l_hand_extra", Side::Left, "hand").with_parent(JointId(0)),
        labeled("r_hand", Side::Right, "hand").with_parent(JointId(0)),
    ])
    .unwrap();
    let report = check_rig(cube(), skeleton, None, &clean_config()).unwrap();
    let labels: Vec<_> = report.for_rule(RuleId::Labels).collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].severity, Severity::Error);
    // No guessed pairing, so no symmetry findings for the ambiguous kind
    assert_eq!(report.for_rule(RuleId::JointSymmetry).count(), 0);
}

#[test]
fn test_dangling_index_aborts() {
    let mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 3]]);
    let err = check_rig(mesh, Skeleton::default(), None, &clean_config()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::Snapshot(SnapshotError::MalformedMesh(
            MalformedMeshError::IndexOutOfRange {
                face: 0,
                index: 3,
                vertex_count: 3
            }
        ))
    );
}

#[test]
fn test_missing_optional_data_is_informational() {
    let report = check_rig(cube(), skeleton(), None, &clean_config()).unwrap();
    let infos: Vec<(RuleId, &str)> = report
        .findings()
        .iter()
        .filter(|f| f.severity == Severity::Info)
        .map(|f| (f.rule, f.message.as_str()))
        .collect();
    assert_eq!(
        infos,
        vec![
            (RuleId::Tweaks, "rule skipped: mesh has no tweak data"),
            (RuleId::MaxInfluences, "rule skipped: mesh has no skin binding"),
            (RuleId::WeightNormalization, "rule skipped: mesh has no skin binding"),
        ]
    );
    assert!(!report.has_errors());
    assert!(!report.has_warnings());
}

#[test]
fn test_disabled_rules_do_not_run() {
    let config = RigConfig {
        disabled_rules: vec![RuleId::Tweaks, RuleId::MaxInfluences, RuleId::WeightNormalization],
        ..clean_config()
    };
    let report = check_rig(cube(), skeleton(), None, &config).unwrap();
    assert!(report.findings().is_empty(), "{report}");
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = RigConfig {
        position_tolerance: f32::NAN,
        ..clean_config()
    };
    assert!(matches!(
        check_rig(cube(), skeleton(), None, &config),
        Err(ValidationError::Config(_))
    ));
}

#[test]
fn test_parallel_matches_sequential() {
    let mut positions = cube().positions().to_vec();
    positions[6] = Vec3::new(1.3, 1.0, 1.0);
    let mesh = Mesh::new(positions, cube().faces().to_vec());
    let mut joints = skeleton().joints().to_vec();
    joints[2].local = Transform::from_translation(Vec3::new(-1.2, 0.0, 0.0));
    joints.push(Joint::new("prop").with_orient(Quat::from_rotation_x(0.3)));
    let snapshot = RigSnapshot::new(mesh, Skeleton::new(joints).unwrap(), None).unwrap();

    let engine = RuleEngine::with_default_rules();
    let sequential = engine.run(&snapshot, &clean_config()).unwrap();
    let parallel = engine
        .run(
            &snapshot,
            &RigConfig {
                parallel: true,
                ..clean_config()
            },
        )
        .unwrap();
    assert_eq!(sequential, parallel);
    assert!(sequential.warnings() > 0);
}
