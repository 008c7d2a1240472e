// src/db/store.rs

//! Summary store implementations

use super::{SummaryLookup, SummaryStore, schema};
use crate::error::{Error, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// SQLite-backed summary cache
///
/// The connection sits behind a mutex so scans can share the store by
/// reference across threads.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the cache at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        debug!("Opening summary cache at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// A throwaway in-memory cache
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::DatabaseError("summary cache lock poisoned".to_string()))
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn
            .get_mut()
            .map_err(|_| Error::DatabaseError("summary cache lock poisoned".to_string()))
    }

    /// Number of packages with a stored summary
    pub fn package_count(&self) -> Result<usize> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// When a package's summary was last written
    pub fn updated_at(&self, package: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .query_row(
                "SELECT updated_at FROM summaries WHERE package = ?1",
                [package],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl SummaryLookup for SqliteStore {
    fn summary(&self, package: &str) -> Result<Option<Vec<String>>> {
        let encoded: Option<String> = self
            .lock()?
            .query_row(
                "SELECT versions FROM summaries WHERE package = ?1",
                [package],
                |row| row.get(0),
            )
            .optional()?;

        encoded
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| Error::DatabaseError(format!("Corrupt summary for {package}: {e}")))
    }
}

impl SummaryStore for SqliteStore {
    fn put(&mut self, package: &str, summary: &[String]) -> Result<()> {
        let encoded = serde_json::to_string(summary)?;
        self.conn_mut()?.execute(
            "INSERT INTO summaries (package, versions, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(package) DO UPDATE SET versions = excluded.versions,
                                                updated_at = excluded.updated_at",
            params![package, encoded, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Replace every stored summary in one transaction
    fn replace_all(&mut self, summaries: &[(String, Vec<String>)]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let conn = self.conn_mut()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM summaries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO summaries (package, versions, updated_at) VALUES (?1, ?2, ?3)",
            )?;
            for (package, summary) in summaries {
                stmt.execute(params![package, serde_json::to_string(summary)?, updated_at])?;
            }
        }
        tx.commit()?;

        info!("Stored summaries for {} packages", summaries.len());
        Ok(())
    }
}

/// In-memory summary store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    summaries: HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl SummaryLookup for MemoryStore {
    fn summary(&self, package: &str) -> Result<Option<Vec<String>>> {
        Ok(self.summaries.get(package).cloned())
    }
}

impl SummaryStore for MemoryStore {
    fn put(&mut self, package: &str, summary: &[String]) -> Result<()> {
        self.summaries.insert(package.to_string(), summary.to_vec());
        Ok(())
    }

    fn replace_all(&mut self, summaries: &[(String, Vec<String>)]) -> Result<()> {
        self.summaries = summaries.iter().cloned().collect();
        Ok(())
    }
}
