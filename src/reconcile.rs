// src/reconcile.rs

//! Epoch reconciliation for dependency constraints
//!
//! A lower-bound constraint written before a package bumped its epoch keeps
//! the old epoch, so `foo (>= 1.0)` is trivially satisfied by `2:0.5` once
//! the bump lands. Given a package's minimized history, this module decides
//! whether the constraint's version should gain a newer epoch.

use crate::error::Result;
use crate::version::{Version, compare_bare};
use std::cmp::Ordering;
use tracing::debug;

/// Suggest a replacement for the constraint version `constraint`
///
/// `summary` is the referenced package's minimized history, in stored order.
/// Returns the constraint unchanged when nothing needs fixing.
pub fn fix_version(constraint: &str, summary: &[String]) -> Result<String> {
    let current = Version::parse(constraint)?;
    let entries = summary
        .iter()
        .map(|s| Version::parse(s))
        .collect::<Result<Vec<_>>>()?;

    Ok(match reconcile(&current, &entries) {
        Some(candidate) => candidate.to_string(),
        None => constraint.to_string(),
    })
}

/// Typed form of [`fix_version`]; `None` means the constraint is fine as is
///
/// The first summary entry is the upper bound. Entries are scanned in order
/// and the first qualifying candidate is returned.
pub fn reconcile(current: &Version, summary: &[Version]) -> Option<Version> {
    let upper_bound = summary.first()?;

    for entry in summary {
        if entry.epoch() <= current.epoch() {
            continue;
        }
        if compare_bare(entry.bare(), current.bare()) == Ordering::Greater {
            continue;
        }

        let candidate = current.with_epoch(entry.epoch());
        if candidate <= *upper_bound {
            debug!(
                "{} predates epoch {} (first seen at {}), suggesting {}",
                current,
                entry.epoch(),
                entry,
                candidate
            );
            return Some(candidate);
        }
    }

    None
}
