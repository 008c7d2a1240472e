// src/seed.rs

//! Seeding the summary cache from a history source
//!
//! Histories are fetched concurrently, minimized per package, and written
//! to the store. A full seed (no package list) rebuilds the store
//! wholesale; a partial seed only overwrites the named packages.

use crate::db::SummaryStore;
use crate::error::{Error, Result};
use crate::history::{HistorySource, minimize_all};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

/// What to seed and how
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Packages to seed; empty means everything the source lists
    pub packages: Vec<String>,
    /// Concurrent history fetches
    pub jobs: usize,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            jobs: 4,
            show_progress: false,
        }
    }
}

/// Counters reported after a seed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// Packages whose summary was written
    pub packages: usize,
    /// Raw versions fetched across all packages
    pub versions: usize,
    /// Summary entries written across all packages
    pub summary_entries: usize,
    /// Requested packages the source did not know
    pub missing: Vec<String>,
}

/// Fetch, minimize and store version summaries
pub fn seed<H, S>(source: &H, store: &mut S, options: &SeedOptions) -> Result<SeedStats>
where
    H: HistorySource + Sync,
    S: SummaryStore,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs.max(1))
        .build()
        .map_err(|e| Error::ConfigError(format!("Failed to start fetch workers: {e}")))?;

    let full = options.packages.is_empty();
    let packages = if full {
        pool.install(|| source.packages())?
    } else {
        options.packages.clone()
    };
    info!("Seeding version summaries for {} packages", packages.len());

    let progress = if options.show_progress {
        let pb = ProgressBar::new(packages.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let fetched: Vec<(String, Option<Vec<String>>)> = pool.install(|| {
        packages
            .par_iter()
            .map(|package| -> Result<(String, Option<Vec<String>>)> {
                let versions = match source.versions(package) {
                    Ok(versions) => Some(versions),
                    Err(Error::NotFoundError(msg)) => {
                        warn!("No history for {}: {}", package, msg);
                        None
                    }
                    Err(e) => return Err(e),
                };
                progress.set_message(package.clone());
                progress.inc(1);
                Ok((package.clone(), versions))
            })
            .collect::<Result<Vec<_>>>()
    })?;
    progress.finish_and_clear();

    let mut stats = SeedStats::default();
    let mut histories = HashMap::new();
    for (package, versions) in fetched {
        match versions {
            Some(versions) => {
                stats.versions += versions.len();
                histories.insert(package, versions);
            }
            None => stats.missing.push(package),
        }
    }

    let summaries = minimize_all(&histories)?;
    stats.packages = summaries.len();
    stats.summary_entries = summaries.iter().map(|(_, s)| s.len()).sum();

    if full {
        store.replace_all(&summaries)?;
    } else {
        for (package, summary) in &summaries {
            store.put(package, summary)?;
        }
    }

    info!(
        "Seeded {} packages ({} versions reduced to {} summary entries)",
        stats.packages, stats.versions, stats.summary_entries
    );
    Ok(stats)
}
