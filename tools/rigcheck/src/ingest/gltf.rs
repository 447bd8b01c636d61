//! glTF / GLB rig import
//!
//! Uses the first node carrying both a mesh and a skin (or, failing that, the
//! first mesh node). Skin joints become the skeleton in skin order, so glTF
//! joint indices map directly to [`JointId`]s. Leaf children of skin joints
//! that are not part of the skin are kept as stub joints; their rotation is
//! treated as the stub's orientation offset.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;
use rigcheck_core::{
    Influence, Joint, JointId, MalformedMeshError, Mesh, RigSnapshot, Skeleton, SkinBinding,
    SnapshotError, SnapshotSource, Transform, VertexWeights,
};
use std::path::{Path, PathBuf};

use super::naming::infer_label;

/// Rig stored as `.gltf` or `.glb`
#[derive(Debug, Clone)]
pub struct GltfSource {
    path: PathBuf,
}

impl GltfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for GltfSource {
    type Error = anyhow::Error;

    fn load(&self) -> Result<RigSnapshot> {
        let (document, buffers, _images) = gltf::import(&self.path)
            .with_context(|| format!("Failed to load glTF: {:?}", self.path))?;
        build_snapshot(&document, &buffers)
            .with_context(|| format!("Invalid rig: {:?}", self.path))
    }
}

fn build_snapshot(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<RigSnapshot> {
    let node = document
        .nodes()
        .find(|n| n.mesh().is_some() && n.skin().is_some())
        .or_else(|| document.nodes().find(|n| n.mesh().is_some()))
        .context("No mesh nodes found in glTF")?;
    let gltf_mesh = node.mesh().context("Mesh node has no mesh")?;

    let hierarchy = Hierarchy::new(document);
    let (skeleton, skin_joint_count) = match node.skin() {
        Some(skin) => (
            read_skeleton(&skin, &hierarchy, buffers)?,
            skin.joints().count(),
        ),
        None => {
            tracing::info!("Mesh node has no skin; checking mesh only");
            (Skeleton::default(), 0)
        }
    };

    let (mesh, weights) = read_mesh(&gltf_mesh, buffers, skin_joint_count)?;
    let skin = node.skin().map(|_| SkinBinding::new(weights));

    Ok(RigSnapshot::new(mesh, skeleton, skin)?)
}

/// Parent links and world matrices for the node graph
struct Hierarchy<'a> {
    nodes: Vec<gltf::Node<'a>>,
    parents: HashMap<usize, usize>,
}

impl<'a> Hierarchy<'a> {
    fn new(document: &'a gltf::Document) -> Self {
        let nodes: Vec<gltf::Node<'a>> = document.nodes().collect();
        let mut parents = HashMap::new();
        for node in &nodes {
            for child in node.children() {
                parents.insert(child.index(), node.index());
            }
        }
        Self { nodes, parents }
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(&node).copied()
    }

    /// World matrix of a node; a malformed graph with cycles stops after
    /// visiting every node once
    fn world_matrix(&self, node: usize) -> Mat4 {
        let mut matrix = local_matrix(&self.nodes[node]);
        let mut current = node;
        for _ in 0..self.nodes.len() {
            let Some(parent) = self.parent(current) else {
                break;
            };
            matrix = local_matrix(&self.nodes[parent]) * matrix;
            current = parent;
        }
        matrix
    }
}

fn local_matrix(node: &gltf::Node) -> Mat4 {
    Mat4::from_cols_array_2d(&node.transform().matrix())
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn read_skeleton(
    skin: &gltf::Skin,
    hierarchy: &Hierarchy,
    buffers: &[gltf::buffer::Data],
) -> Result<Skeleton> {
    let skin_nodes: Vec<gltf::Node> = skin.joints().collect();
    if skin_nodes.is_empty() {
        bail!("Skin '{}' has no joints", skin.name().unwrap_or("unnamed"));
    }

    let joint_of: HashMap<usize, JointId> = skin_nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.index(), JointId(i)))
        .collect();

    let bind_world = read_bind_matrices(skin, buffers, skin_nodes.len());

    let mut joints = Vec::with_capacity(skin_nodes.len());
    for (i, node) in skin_nodes.iter().enumerate() {
        let name = node_name(node);
        let parent_node = hierarchy.parent(node.index());
        let parent = parent_node.and_then(|p| joint_of.get(&p).copied());

        let (translation, rotation, scale) = node.transform().decomposed();
        let mut joint = Joint::new(name.clone())
            .with_label(infer_label(&name))
            .with_local(Transform::new(
                Vec3::from_array(translation),
                Quat::from_array(rotation),
                Vec3::from_array(scale),
            ));
        if let Some(parent) = parent {
            joint = joint.with_parent(parent);
        }

        if let Some(bind_world) = &bind_world {
            // Bind pose relative to the parent joint, or to the non-joint
            // ancestors for skin roots
            let parent_world = match (parent, parent_node) {
                (Some(p), _) => bind_world[p.0],
                (None, Some(ancestor)) => hierarchy.world_matrix(ancestor),
                (None, None) => Mat4::IDENTITY,
            };
            let local = parent_world.inverse() * bind_world[i];
            joint = joint.with_bind_pose(Transform::from_matrix(local));
        }

        joints.push(joint);
    }

    // Leaf children outside the skin become stub joints
    for (i, node) in skin_nodes.iter().enumerate() {
        for child in node.children() {
            let is_leaf = child.children().next().is_none();
            if joint_of.contains_key(&child.index()) || !is_leaf || child.mesh().is_some() {
                continue;
            }
            let name = node_name(&child);
            let (translation, rotation, scale) = child.transform().decomposed();
            tracing::debug!("Stub joint '{}' under '{}'", name, joints[i].name);
            joints.push(
                Joint::new(name.clone())
                    .with_label(infer_label(&name))
                    .with_parent(JointId(i))
                    .with_local(Transform::new(
                        Vec3::from_array(translation),
                        Quat::IDENTITY,
                        Vec3::from_array(scale),
                    ))
                    .with_orient(Quat::from_array(rotation)),
            );
        }
    }

    Ok(Skeleton::new(joints)?)
}

/// World-space bind matrices (inverse of the inverse bind matrices)
fn read_bind_matrices(
    skin: &gltf::Skin,
    buffers: &[gltf::buffer::Data],
    joint_count: usize,
) -> Option<Vec<Mat4>> {
    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let Some(iter) = reader.read_inverse_bind_matrices() else {
        tracing::warn!(
            "Skin '{}' has no inverse bind matrices, bind pose checks are limited",
            skin.name().unwrap_or("unnamed")
        );
        return None;
    };

    let matrices: Vec<Mat4> = iter
        .map(|m| Mat4::from_cols_array_2d(&m).inverse())
        .collect();
    if matrices.len() != joint_count {
        tracing::warn!(
            "Skin has {} inverse bind matrices for {} joints, ignoring bind pose",
            matrices.len(),
            joint_count
        );
        return None;
    }
    Some(matrices)
}

/// Merge every triangle primitive into one mesh, collecting all
/// `JOINTS_n`/`WEIGHTS_n` sets per vertex
fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    skin_joint_count: usize,
) -> Result<(Mesh, Vec<VertexWeights>)> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut triangles: Vec<[u32; 3]> = Vec::new();
    let mut weights: Vec<VertexWeights> = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!(
                "Skipping primitive {} with mode {:?} (only triangles are checked)",
                primitive.index(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let base = positions.len() as u32;
        let primitive_positions: Vec<Vec3> = reader
            .read_positions()
            .context("No positions in primitive")?
            .map(Vec3::from_array)
            .collect();
        let count = primitive_positions.len() as u32;

        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..count).collect(),
        };
        if indices.len() % 3 != 0 {
            tracing::warn!(
                "Primitive {} has {} indices, ignoring trailing {}",
                primitive.index(),
                indices.len(),
                indices.len() % 3
            );
        }
        if let Some(position) = indices.iter().position(|&index| index >= count) {
            let error = SnapshotError::from(MalformedMeshError::IndexOutOfRange {
                face: triangles.len() + position / 3,
                index: indices[position],
                vertex_count: count as usize,
            });
            return Err(error).with_context(|| {
                format!(
                    "Primitive {} of mesh '{}'",
                    primitive.index(),
                    mesh.name().unwrap_or("<unnamed>")
                )
            });
        }
        triangles.extend(
            indices
                .chunks_exact(3)
                .map(|t| [base + t[0], base + t[1], base + t[2]]),
        );

        let mut primitive_weights = vec![VertexWeights::new(); primitive_positions.len()];
        let mut set = 0;
        while skin_joint_count > 0 {
            let (Some(joints), Some(set_weights)) = (reader.read_joints(set), reader.read_weights(set))
            else {
                break;
            };
            for (vertex, (joint_ids, values)) in joints
                .into_u16()
                .zip(set_weights.into_f32())
                .enumerate()
                .take(primitive_weights.len())
            {
                for (&joint, &weight) in joint_ids.iter().zip(values.iter()) {
                    if weight == 0.0 {
                        continue;
                    }
                    if joint as usize >= skin_joint_count {
                        bail!(
                            "Vertex {} references joint {} but the skin has {} joints",
                            base as usize + vertex,
                            joint,
                            skin_joint_count
                        );
                    }
                    primitive_weights[vertex].push(Influence::new(JointId(joint as usize), weight));
                }
            }
            set += 1;
        }

        positions.extend(primitive_positions);
        weights.extend(primitive_weights);
    }

    tracing::debug!(
        vertices = positions.len(),
        triangles = triangles.len(),
        "glTF mesh merged"
    );

    Ok((Mesh::from_triangles(positions, &triangles), weights))
}
