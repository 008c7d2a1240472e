// src/history/mod.rs

//! Version history collection and minimization
//!
//! A package's full history can hold hundreds of versions. Detecting an
//! epoch-crossing constraint only needs, per epoch, the lowest version that
//! epoch ever produced, plus the highest version of the newest epoch as an
//! upper bound. This module reduces a history to that summary.

mod snapshot;

pub use snapshot::{BinaryHistory, HistorySource, SnapshotApi, SnapshotClient};

use crate::error::{Error, Result};
use crate::version::Version;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Every version observed per package, in no particular order
#[derive(Debug, Clone, Default)]
pub struct History {
    packages: HashMap<String, Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single `(package, version)` observation
    pub fn record(&mut self, package: impl Into<String>, version: impl Into<String>) {
        self.packages
            .entry(package.into())
            .or_default()
            .push(version.into());
    }

    /// Record a batch of observations
    pub fn extend<I, P, V>(&mut self, observations: I)
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<String>,
        V: Into<String>,
    {
        for (package, version) in observations {
            self.record(package, version);
        }
    }

    /// Versions recorded for a package
    pub fn versions(&self, package: &str) -> Option<&[String]> {
        self.packages.get(package).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Minimize every package, see [`minimize_all`]
    pub fn minimize(&self) -> Result<Vec<(String, Vec<String>)>> {
        minimize_all(&self.packages)
    }
}

/// Reduce a raw version history to its minimized summary
///
/// Output order: the maximum of the highest epoch, then the minimum of each
/// epoch in descending epoch order. The maximum is only kept when the history
/// spans more than one epoch and the highest epoch has more than one distinct
/// version, so a never-bumped package reduces to a single entry.
pub fn minimize(history: &[String]) -> Result<Vec<String>> {
    let versions = history
        .iter()
        .map(|s| Version::parse(s))
        .collect::<Result<Vec<_>>>()?;

    Ok(minimize_versions(versions)
        .into_iter()
        .map(|v| v.to_string())
        .collect())
}

/// Typed form of [`minimize`]
pub fn minimize_versions(mut versions: Vec<Version>) -> Vec<Version> {
    // Stable sort so equal versions keep input order and the result is reproducible
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup_by(|later, earlier| later == earlier);

    let spans_epochs = match (versions.first(), versions.last()) {
        (Some(highest), Some(lowest)) => highest.epoch() != lowest.epoch(),
        _ => false,
    };

    let mut summary = Vec::new();
    let mut run_start = 0;

    for i in 1..=versions.len() {
        let run_ended = i == versions.len() || versions[i].epoch() != versions[run_start].epoch();
        if !run_ended {
            continue;
        }

        let run = &versions[run_start..i];
        if run_start == 0 && spans_epochs && run.len() > 1 {
            summary.push(run[0].clone());
        }
        summary.push(run[run.len() - 1].clone());
        run_start = i;
    }

    summary
}

/// Minimize many packages' histories in parallel
///
/// Results are sorted by package name. A malformed version anywhere fails
/// the batch, naming the package it came from.
pub fn minimize_all(histories: &HashMap<String, Vec<String>>) -> Result<Vec<(String, Vec<String>)>> {
    info!("Minimizing version histories for {} packages", histories.len());

    let mut summaries = histories
        .par_iter()
        .map(|(package, versions)| -> Result<(String, Vec<String>)> {
            let summary = minimize(versions).map_err(|e| match e {
                Error::MalformedVersion { version, reason } => Error::MalformedVersion {
                    version,
                    reason: format!("{reason} (package {package})"),
                },
                other => other,
            })?;
            debug!(
                "{}: {} versions minimized to {}",
                package,
                versions.len(),
                summary.len()
            );
            Ok((package.clone(), summary))
        })
        .collect::<Result<Vec<_>>>()?;

    summaries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_minimize_single_version() {
        assert_eq!(minimize(&strings(&["1.0"])).unwrap(), strings(&["1.0"]));
    }

    #[test]
    fn test_minimize_single_epoch() {
        let summary = minimize(&strings(&["1.2", "1.0", "1.10", "1.1"])).unwrap();
        assert_eq!(summary, strings(&["1.0"]));
    }

    #[test]
    fn test_minimize_single_epoch_explicit() {
        let summary = minimize(&strings(&["1:2.0", "1:1.0", "1:1.5"])).unwrap();
        assert_eq!(summary, strings(&["1:1.0"]));

        // A one-entry summary leaves same-epoch constraints alone
        assert_eq!(crate::reconcile::fix_version("1.5", &summary).unwrap(), "1.5");
    }

    #[test]
    fn test_minimize_size_bound_across_histories() {
        let histories: [&[&str]; 7] = [
            &["1.0"],
            &["1.2", "1.0", "1.10", "1.1"],
            &["3:1", "3:2", "3:0.5"],
            &["1:2.0", "1:3.0", "2:0.1", "2:0.1"],
            &["0.9", "1.0", "1:0.5", "1:0.7", "2:0.1", "2:0.3"],
            &["3:1", "0.1", "0.2", "1:5", "1:4", "3:0.5", "3:2", "2:9"],
            &["1.0-1", "0:1.0-1", "1.0", "1:1.0~rc1", "1:1.0"],
        ];

        for history in histories {
            let history = strings(history);
            let summary = minimize(&history).unwrap();
            let epochs: BTreeSet<u64> = history
                .iter()
                .map(|s| crate::version::epoch(s).unwrap())
                .collect();

            assert!(summary.len() <= epochs.len() + 1, "{history:?} -> {summary:?}");
            if epochs.len() == 1 {
                assert_eq!(summary.len(), 1, "{history:?} -> {summary:?}");
            }
            assert_eq!(minimize(&summary).unwrap(), summary);
        }
    }

    #[test]
    fn test_minimize_highest_run_single_member() {
        let summary = minimize(&strings(&["1:2.0", "1:3.0", "2:0.1"])).unwrap();
        assert_eq!(summary, strings(&["2:0.1", "1:2.0"]));
    }

    #[test]
    fn test_minimize_collapses_duplicates() {
        let summary = minimize(&strings(&["1:2.0", "1:3.0", "2:0.1", "2:0.1"])).unwrap();
        assert_eq!(summary, strings(&["2:0.1", "1:2.0"]));
    }

    #[test]
    fn test_minimize_highest_run_keeps_max() {
        let summary = minimize(&strings(&["0.9", "1.0", "1:0.5", "1:0.7", "2:0.1", "2:0.3"])).unwrap();
        assert_eq!(summary, strings(&["2:0.3", "2:0.1", "1:0.5", "0.9"]));
    }

    #[test]
    fn test_minimize_empty_history() {
        assert!(minimize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_minimize_malformed_is_fatal() {
        let result = minimize(&strings(&["1.0", "x:2.0"]));
        assert!(matches!(result, Err(Error::MalformedVersion { .. })));
    }

    #[test]
    fn test_minimize_completeness_and_bound() {
        let history = strings(&["3:1", "0.1", "0.2", "1:5", "1:4", "3:0.5", "3:2", "2:9"]);
        let summary = minimize(&history).unwrap();

        let input_epochs: BTreeSet<u64> = history
            .iter()
            .map(|s| crate::version::epoch(s).unwrap())
            .collect();
        let output_epochs: BTreeSet<u64> = summary
            .iter()
            .map(|s| crate::version::epoch(s).unwrap())
            .collect();

        assert_eq!(input_epochs, output_epochs);
        assert!(summary.iter().all(|s| history.contains(s)));
        assert!(summary.len() <= input_epochs.len() + 1);
        assert_eq!(summary, strings(&["3:2", "3:0.5", "2:9", "1:4", "0.1"]));
    }

    #[test]
    fn test_minimize_idempotent() {
        let history = strings(&["3:1", "0.1", "0.2", "1:5", "1:4", "3:0.5", "3:2", "2:9"]);
        let once = minimize(&history).unwrap();
        let twice = minimize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_minimize_equal_versions_is_deterministic() {
        // "1.0" and "0:1.0" compare equal; the first in input order survives
        assert_eq!(minimize(&strings(&["1.0", "0:1.0"])).unwrap(), strings(&["1.0"]));
        assert_eq!(minimize(&strings(&["0:1.0", "1.0"])).unwrap(), strings(&["0:1.0"]));
    }

    #[test]
    fn test_history_record_and_minimize_all() {
        let mut history = History::new();
        history.extend([("foo", "1.0"), ("foo", "1:0.1"), ("bar", "2.0")]);
        history.record("foo", "1:0.2");

        assert_eq!(history.len(), 2);
        assert_eq!(history.versions("foo").map(<[String]>::len), Some(3));

        let summaries = history.minimize().unwrap();
        assert_eq!(
            summaries,
            vec![
                ("bar".to_string(), strings(&["2.0"])),
                ("foo".to_string(), strings(&["1:0.2", "1:0.1", "1.0"])),
            ]
        );
    }

    #[test]
    fn test_minimize_all_names_package_on_error() {
        let mut histories = HashMap::new();
        histories.insert("broken".to_string(), strings(&["q:1"]));
        let err = minimize_all(&histories).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
