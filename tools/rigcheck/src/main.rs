//! rigcheck - rig consistency checker
//!
//! Validates skinned meshes and their skeletons (JSON, glTF, GLB) before
//! export: topology, symmetry, skin weights, labels and bind pose.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rigcheck_core::{RigConfig, RuleEngine, RuleId, SymmetryPlane};
use std::path::{Path, PathBuf};

use rigcheck::{describe_snapshot, find_manifest, load_manifest, load_snapshot, render_report, OutputFormat};

#[derive(Parser)]
#[command(name = "rigcheck")]
#[command(about = "Rig consistency checker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every enabled rule against a rig
    Check {
        /// Input rig (.json, .gltf or .glb)
        input: PathBuf,

        /// Path to rigcheck.toml (default: next to the input, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Maximum joint influences per vertex (0 disables the check)
        #[arg(long)]
        max_influences: Option<u32>,

        /// Symmetry plane (yz, xz or xy)
        #[arg(long)]
        plane: Option<SymmetryPlane>,

        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,

        /// Evaluate rules in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// List available rules
    Rules,

    /// Print rig statistics and the joint hierarchy
    Inspect {
        /// Input rig (.json, .gltf or .glb)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            input,
            config,
            format,
            max_influences,
            plane,
            strict,
            parallel,
        } => {
            let mut rules = load_config(&input, config.as_deref())?;
            if let Some(max) = max_influences {
                rules.max_influences = max;
            }
            if let Some(plane) = plane {
                rules.symmetry_plane = plane;
            }
            rules.parallel |= parallel;

            let snapshot = load_snapshot(&input)?;
            let report = RuleEngine::with_default_rules()
                .run(&snapshot, &rules)
                .context("Invalid rule configuration")?;

            println!("{}", render_report(&report, format)?);

            if report.has_errors() {
                bail!("{} error(s) found in {:?}", report.errors(), input);
            }
            if strict && report.has_warnings() {
                bail!(
                    "{} warning(s) found in {:?} (--strict)",
                    report.warnings(),
                    input
                );
            }
        }
        Commands::Rules => {
            for id in RuleId::ALL {
                println!("{:<22} {}", id.as_str(), id.description());
            }
        }
        Commands::Inspect { input } => {
            let snapshot = load_snapshot(&input)?;
            print!("{}", describe_snapshot(&snapshot));
        }
    }

    Ok(())
}

fn load_config(input: &Path, explicit: Option<&Path>) -> Result<RigConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_manifest(input),
    };
    match path {
        Some(path) => {
            tracing::info!("Using config {:?}", path);
            Ok(load_manifest(&path)?.rules)
        }
        None => Ok(RigConfig::default()),
    }
}
