// src/cli.rs
//! CLI definitions for epoch-audit
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use epoch_audit::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "epoch-audit")]
#[command(author = "Epoch Audit Contributors")]
#[command(version)]
#[command(about = "Find dependency constraints invalidated by an epoch bump", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $EPOCH_AUDIT_CONFIG or /etc/epoch-audit/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch version histories and rebuild the summary cache
    Seed {
        /// Binary packages to seed (default: every binary in the snapshot archive)
        packages: Vec<String>,

        /// Path to the summary cache
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Snapshot archive base URL
        #[arg(long)]
        url: Option<String>,

        /// Concurrent history fetches
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Scan control files for constraints that predate an epoch bump
    Scan {
        /// Control files to scan ("-" reads standard input)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path to the summary cache
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,
    },

    /// Show the stored summary for a package
    Show {
        /// Package name
        package: String,

        /// Path to the summary cache
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Minimize a version history given on the command line
    Minimize {
        /// Observed versions, in any order
        #[arg(required = true)]
        versions: Vec<String>,
    },

    /// Check a single constraint version against a summary
    Fix {
        /// Version recorded in the dependency constraint
        version: String,

        /// Minimized summary of the referenced package, in stored order
        summary: Vec<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}
