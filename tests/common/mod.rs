// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use epoch_audit::{Error, HistorySource, Result, SeedOptions, SnapshotApi, SqliteStore};
use std::collections::HashMap;
use tempfile::TempDir;

/// In-memory stand-in for the snapshot archive
pub struct FixtureSource {
    pub histories: HashMap<String, Vec<String>>,
}

impl HistorySource for FixtureSource {
    fn packages(&self) -> Result<Vec<String>> {
        let mut names: Vec<_> = self.histories.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn versions(&self, package: &str) -> Result<Vec<String>> {
        self.histories
            .get(package)
            .cloned()
            .ok_or_else(|| Error::NotFoundError(package.to_string()))
    }
}

/// Archive history used across tests.
///
/// - libfoo: 1.0 .. 1.8, then epoch 1 restarting at 1.2
/// - libbar: a single epoch, never bumped
/// - libbaz: bumped to epoch 2 at 0.1, candidates above that are rejected
pub fn fixture_source() -> FixtureSource {
    let mut histories = HashMap::new();
    let mut add = |name: &str, versions: &[&str]| {
        histories.insert(
            name.to_string(),
            versions.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        );
    };

    add("libfoo", &["1.0-1", "1.5-1", "1.8-2", "1:1.2-1", "1:2.0-1", "1:2.0-1"]);
    add("libbar", &["2.0-1", "2.1-1", "3.0-1"]);
    add("libbaz", &["1:2.0", "1:3.0", "2:0.1"]);

    FixtureSource { histories }
}

/// Seed a fresh SQLite cache from the fixture source.
///
/// Returns (TempDir, store) - keep the TempDir alive to prevent cleanup.
pub fn seeded_store() -> (TempDir, SqliteStore) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("summaries.db");

    let mut store = SqliteStore::open(&path).unwrap();
    epoch_audit::seed(&fixture_source(), &mut store, &SeedOptions::default()).unwrap();

    (temp_dir, store)
}

/// In-memory stand-in for the snapshot API, where binary names differ from
/// their source names.
///
/// - openssl builds libssl3, whose binary history bumped to epoch 1
/// - zlib builds zlib1g, never bumped
pub struct FixtureArchive;

impl SnapshotApi for FixtureArchive {
    fn source_packages(&self) -> Result<Vec<String>> {
        Ok(vec!["openssl".to_string(), "zlib".to_string()])
    }

    fn source_versions(&self, source: &str) -> Result<Vec<String>> {
        let versions: &[&str] = match source {
            "openssl" => &["3.0.2-1", "1:3.0.5-1", "1:3.0.9-1"],
            "zlib" => &["1.2.11-4", "1.2.13-1"],
            _ => return Err(Error::NotFoundError(source.to_string())),
        };
        Ok(versions.iter().map(|s| s.to_string()).collect())
    }

    fn binary_packages(&self, source: &str, version: &str) -> Result<Vec<String>> {
        match (source, version) {
            ("openssl", "1:3.0.9-1") => Ok(vec!["libssl3".to_string(), "openssl".to_string()]),
            ("zlib", "1.2.13-1") => Ok(vec!["zlib1g".to_string()]),
            _ => Err(Error::NotFoundError(format!("{source} {version}"))),
        }
    }

    fn binary_versions(&self, binary: &str) -> Result<Vec<String>> {
        let versions: &[&str] = match binary {
            "libssl3" => &["3.0.2-1", "3.0.2-1+b1", "1:3.0.5-1", "1:3.0.9-1"],
            "openssl" => &["3.0.2-1", "1:3.0.9-1"],
            "zlib1g" => &["1:1.2.11-4", "1:1.2.13-1"],
            _ => return Err(Error::NotFoundError(binary.to_string())),
        };
        Ok(versions.iter().map(|s| s.to_string()).collect())
    }
}
