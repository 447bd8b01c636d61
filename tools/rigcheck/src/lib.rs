//! rigcheck library
//!
//! Loads rigs from disk and renders validation reports. The checks
//! themselves live in `rigcheck-core`.

pub mod ingest;
pub mod manifest;
pub mod output;

pub use ingest::{load_snapshot, GltfSource, JsonSource};
pub use manifest::{find_manifest, load_manifest, RigcheckManifest};
pub use output::{describe_snapshot, render_report, OutputFormat};
