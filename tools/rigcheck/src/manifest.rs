//! rigcheck.toml manifest parsing
//!
//! ```toml
//! [rules]
//! max_influences = 4
//! symmetry_plane = "yz"
//! disabled_rules = ["tweaks"]
//! ```

use anyhow::{Context, Result};
use rigcheck_core::RigConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up next to the input rig
pub const MANIFEST_NAME: &str = "rigcheck.toml";

/// rigcheck.toml manifest structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigcheckManifest {
    /// Rule options; every key is optional
    #[serde(default)]
    pub rules: RigConfig,
}

/// Load and validate a manifest
pub fn load_manifest(path: &Path) -> Result<RigcheckManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: RigcheckManifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest
        .rules
        .validate()
        .with_context(|| format!("Invalid [rules] in {:?}", path))?;
    Ok(manifest)
}

/// `rigcheck.toml` in the input's directory, if present
pub fn find_manifest(input: &Path) -> Option<PathBuf> {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let candidate = dir.join(MANIFEST_NAME);
    candidate.is_file().then_some(candidate)
}
