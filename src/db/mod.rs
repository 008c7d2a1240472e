// src/db/mod.rs

//! Durable cache of minimized version summaries
//!
//! The seeding step writes one summary per package; scans only read.

pub mod schema;
mod store;

pub use store::{MemoryStore, SqliteStore};

use crate::error::Result;
use std::collections::HashMap;

/// Read access to per-package summaries
///
/// Implementations must be usable from several scanning threads at once.
pub trait SummaryLookup: Sync {
    /// The stored summary for a package, or `None` when it is untracked
    fn summary(&self, package: &str) -> Result<Option<Vec<String>>>;
}

/// A writable summary store
pub trait SummaryStore: SummaryLookup {
    fn put(&mut self, package: &str, summary: &[String]) -> Result<()>;

    /// Rebuild the store from scratch with the given summaries
    fn replace_all(&mut self, summaries: &[(String, Vec<String>)]) -> Result<()>;

    fn get(&self, package: &str) -> Result<Option<Vec<String>>> {
        self.summary(package)
    }
}

impl SummaryLookup for HashMap<String, Vec<String>> {
    fn summary(&self, package: &str) -> Result<Option<Vec<String>>> {
        Ok(self.get(package).cloned())
    }
}
