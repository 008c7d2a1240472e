// src/lib.rs

//! Epoch Audit
//!
//! Finds dependency constraints that were written before the referenced
//! package bumped its version epoch. Because the epoch dominates version
//! comparison, such a constraint silently stops being a meaningful lower
//! bound once the bump lands.
//!
//! # Architecture
//!
//! - Version model: epoch-first ordering over dpkg-style versions
//! - History minimizer: reduces a package's full history to a per-epoch summary
//! - Reconciler: decides whether a constraint should gain a newer epoch
//! - Scanner: applies the reconciler to every lower-bound relation in control files
//!
//! Summaries are seeded from the snapshot archive and cached in SQLite.

pub mod config;
pub mod control;
pub mod db;
mod error;
pub mod history;
pub mod reconcile;
pub mod report;
pub mod scanner;
pub mod seed;
pub mod version;

pub use config::Config;
pub use control::{Operator, Paragraph, Relation, parse_control, parse_relations};
pub use db::{MemoryStore, SqliteStore, SummaryLookup, SummaryStore};
pub use error::{Error, Result};
pub use history::{
    BinaryHistory, History, HistorySource, SnapshotApi, SnapshotClient, minimize, minimize_all,
};
pub use reconcile::{fix_version, reconcile};
pub use report::{ReportFormat, render};
pub use scanner::{Finding, ParagraphKind, Scanner};
pub use seed::{SeedOptions, SeedStats, seed};
pub use version::Version;
