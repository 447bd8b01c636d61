//! JSON rig snapshots
//!
//! ```json
//! {
//!   "mesh": { "positions": [[0,0,0], ...], "faces": [[0,1,2], ...] },
//!   "joints": [
//!     { "name": "hips" },
//!     { "name": "l_thigh", "parent": "hips", "translation": [0.1, 0, 0] }
//!   ],
//!   "weights": [{ "hips": 1.0 }, ...]
//! }
//! ```
//!
//! Joints reference parents by name. Labels are inferred from joint names
//! unless `side`/`kind` are given. `weights` is optional; when present it has
//! one map per vertex, keyed by joint name.

use anyhow::{bail, Context, Result};
use glam::{Quat, Vec3};
use rigcheck_core::{
    Influence, Joint, JointId, JointLabel, Mesh, RigSnapshot, Side, Skeleton, SkinBinding,
    SnapshotSource, Transform,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::naming::infer_label;

/// Top-level JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonRig {
    pub mesh: MeshDesc,
    #[serde(default)]
    pub joints: Vec<JointDesc>,
    /// Per-vertex weights keyed by joint name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<BTreeMap<String, f32>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshDesc {
    pub positions: Vec<[f32; 3]>,
    pub faces: Vec<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweaks: Option<Vec<[f32; 3]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointDesc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub local: TransformDesc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_pose: Option<TransformDesc>,
    /// Orientation offset quaternion (x, y, z, w)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orient: Option<[f32; 4]>,
}

/// Translation, rotation (x, y, z, w) and scale; all optional
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransformDesc {
    #[serde(default = "default_translation")]
    pub translation: [f32; 3],
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

fn default_translation() -> [f32; 3] {
    [0.0; 3]
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0; 3]
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translation: default_translation(),
            rotation: default_rotation(),
            scale: default_scale(),
        }
    }
}

impl From<TransformDesc> for Transform {
    fn from(desc: TransformDesc) -> Self {
        Transform::new(
            Vec3::from_array(desc.translation),
            Quat::from_array(desc.rotation),
            Vec3::from_array(desc.scale),
        )
    }
}

impl JsonRig {
    /// Resolve names and build a validated snapshot
    pub fn into_snapshot(self) -> Result<RigSnapshot> {
        let mesh = build_mesh(self.mesh);
        let skeleton = build_skeleton(&self.joints)?;
        let skin = self
            .weights
            .map(|weights| build_skin(&weights, &skeleton))
            .transpose()?;
        Ok(RigSnapshot::new(mesh, skeleton, skin)?)
    }
}

fn build_mesh(desc: MeshDesc) -> Mesh {
    let positions = desc.positions.into_iter().map(Vec3::from_array).collect();
    let faces = desc.faces.into_iter().map(SmallVec::from_vec).collect();
    let mesh = Mesh::new(positions, faces);
    match desc.tweaks {
        Some(tweaks) => mesh.with_tweaks(tweaks.into_iter().map(Vec3::from_array).collect()),
        None => mesh,
    }
}

fn build_skeleton(descs: &[JointDesc]) -> Result<Skeleton> {
    let index: BTreeMap<&str, usize> = descs
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    let mut joints = Vec::with_capacity(descs.len());
    for desc in descs {
        let mut joint = Joint::new(desc.name.clone())
            .with_label(label_for(desc))
            .with_local(desc.local.into());

        if let Some(parent) = &desc.parent {
            let parent_index = index.get(parent.as_str()).with_context(|| {
                format!("Joint '{}' has unknown parent '{}'", desc.name, parent)
            })?;
            joint = joint.with_parent(JointId(*parent_index));
        }
        if let Some(bind) = desc.bind_pose {
            joint = joint.with_bind_pose(bind.into());
        }
        if let Some(orient) = desc.orient {
            joint = joint.with_orient(Quat::from_array(orient));
        }
        joints.push(joint);
    }

    Ok(Skeleton::new(joints)?)
}

fn label_for(desc: &JointDesc) -> JointLabel {
    match (desc.side, &desc.kind) {
        (None, None) => infer_label(&desc.name),
        (side, kind) => {
            let inferred = infer_label(&desc.name);
            JointLabel {
                side: side.unwrap_or(inferred.side),
                kind: kind.clone().or(inferred.kind),
            }
        }
    }
}

fn build_skin(weights: &[BTreeMap<String, f32>], skeleton: &Skeleton) -> Result<SkinBinding> {
    let mut per_vertex = Vec::with_capacity(weights.len());
    for (vertex, map) in weights.iter().enumerate() {
        let mut influences = SmallVec::new();
        for (name, &weight) in map {
            let Some(joint) = skeleton.find(name) else {
                bail!("Vertex {} is weighted to unknown joint '{}'", vertex, name);
            };
            influences.push(Influence::new(joint, weight));
        }
        per_vertex.push(influences);
    }
    Ok(SkinBinding::new(per_vertex))
}

/// Rig stored as a JSON document
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonSource {
    type Error = anyhow::Error;

    fn load(&self) -> Result<RigSnapshot> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read rig: {:?}", self.path))?;
        let rig: JsonRig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse rig JSON: {:?}", self.path))?;
        rig.into_snapshot()
            .with_context(|| format!("Invalid rig: {:?}", self.path))
    }
}
