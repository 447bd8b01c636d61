//! Rig ingestion
//!
//! Each file format implements [`SnapshotSource`]; [`load_snapshot`] picks the
//! source by file extension.

mod gltf;
mod json;
pub mod naming;

pub use self::gltf::GltfSource;
pub use self::json::{JointDesc, JsonRig, JsonSource, MeshDesc, TransformDesc};

use anyhow::{bail, Result};
use rigcheck_core::{RigSnapshot, SnapshotSource};
use std::path::Path;

/// Load a rig snapshot from a `.json`, `.gltf` or `.glb` file
pub fn load_snapshot(path: &Path) -> Result<RigSnapshot> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let snapshot = match extension.as_deref() {
        Some("json") => JsonSource::new(path).load()?,
        Some("gltf") | Some("glb") => GltfSource::new(path).load()?,
        Some(other) => bail!("Unsupported rig format '.{}': {:?}", other, path),
        None => bail!("Cannot determine rig format (no file extension): {:?}", path),
    };

    tracing::info!(
        "Loaded rig: {} vertices, {} joints from {:?}",
        snapshot.mesh().vertex_count(),
        snapshot.skeleton().len(),
        path
    );

    Ok(snapshot)
}
