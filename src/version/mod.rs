// src/version/mod.rs

//! Epoch-aware version handling for Debian archive versions
//!
//! A version is an optional numeric epoch followed by a bare version:
//! `[epoch:]upstream[-revision]`. Ordering is two-level: the epoch is
//! compared numerically first and always dominates, then the bare versions
//! are compared with the dpkg ordering algorithm.
//!
//! Examples:
//! - "1.2.3" → epoch=0, bare="1.2.3"
//! - "2:1.2.3" → epoch=2, bare="1.2.3"
//! - "1:2.3.4-5" → epoch=1, bare="2.3.4-5"

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Separator between the epoch and the bare version
pub const EPOCH_SEPARATOR: char = ':';

/// A parsed version with its epoch split out once at construction
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    bare: String,
    raw: String,
}

impl Version {
    /// Parse a version string
    ///
    /// Fails with `MalformedVersion` when the bare portion is empty, or when
    /// a separator is present and the prefix is not a non-negative integer.
    pub fn parse(s: &str) -> Result<Self> {
        let (epoch, bare) = match s.split_once(EPOCH_SEPARATOR) {
            Some((prefix, rest)) => {
                if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::malformed(s, "epoch is not a non-negative integer"));
                }
                let epoch = prefix
                    .parse::<u64>()
                    .map_err(|e| Error::malformed(s, format!("epoch out of range: {e}")))?;
                (epoch, rest)
            }
            None => (0, s),
        };

        if bare.is_empty() {
            return Err(Error::malformed(s, "empty version component"));
        }

        Ok(Self {
            epoch,
            bare: bare.to_string(),
            raw: s.to_string(),
        })
    }

    /// The numeric epoch (0 when absent)
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The version with any epoch prefix removed
    pub fn bare(&self) -> &str {
        &self.bare
    }

    /// The upstream part of the bare version
    pub fn upstream(&self) -> &str {
        split_revision(&self.bare).0
    }

    /// The Debian revision, if any
    pub fn revision(&self) -> Option<&str> {
        let (_, revision) = split_revision(&self.bare);
        (!revision.is_empty()).then_some(revision)
    }

    /// The string this version was built from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Build a version with the same bare part under a different epoch
    pub fn with_epoch(&self, epoch: u64) -> Self {
        Self {
            epoch,
            bare: self.bare.clone(),
            raw: format!("{}{}{}", epoch, EPOCH_SEPARATOR, self.bare),
        }
    }

    /// Compare two versions: epoch first, then bare version
    pub fn compare(&self, other: &Version) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_bare(&self.bare, &other.bare))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Extract the epoch of a version string
pub fn epoch(version: &str) -> Result<u64> {
    Version::parse(version).map(|v| v.epoch())
}

/// Compare two version strings under the epoch-first order
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    Ok(Version::parse(a)?.compare(&Version::parse(b)?))
}

/// Compare two bare versions (no epoch) with the dpkg algorithm
///
/// The upstream parts are compared first, then the revisions. A missing
/// revision compares like an empty one, so "1.0" and "1.0-0" are equal.
pub fn compare_bare(a: &str, b: &str) -> Ordering {
    let (a_upstream, a_revision) = split_revision(a);
    let (b_upstream, b_revision) = split_revision(b);
    verrevcmp(a_upstream, b_upstream).then_with(|| verrevcmp(a_revision, b_revision))
}

/// Split at the last hyphen into (upstream, revision)
fn split_revision(bare: &str) -> (&str, &str) {
    match bare.rfind('-') {
        Some(pos) => (&bare[..pos], &bare[pos + 1..]),
        None => (bare, ""),
    }
}

/// Sort weight of a non-digit character; `None` is the end of the string
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);
    let is_digit = |s: &[u8], k: usize| s.get(k).is_some_and(u8::is_ascii_digit);

    while i < a.len() || j < b.len() {
        // Non-digit prefix
        while (i < a.len() && !is_digit(a, i)) || (j < b.len() && !is_digit(b, j)) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        // Digit run: the longer run wins, otherwise the first differing digit
        let mut first_diff = Ordering::Equal;
        while is_digit(a, i) && is_digit(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if is_digit(a, i) {
            return Ordering::Greater;
        }
        if is_digit(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse_simple() {
        let version = v("1.2.3");
        assert_eq!(version.epoch(), 0);
        assert_eq!(version.bare(), "1.2.3");
        assert_eq!(version.revision(), None);
    }

    #[test]
    fn test_version_parse_with_epoch() {
        let version = v("2:1.2.3-4");
        assert_eq!(version.epoch(), 2);
        assert_eq!(version.bare(), "1.2.3-4");
        assert_eq!(version.upstream(), "1.2.3");
        assert_eq!(version.revision(), Some("4"));
    }

    #[test]
    fn test_version_parse_colon_in_bare() {
        // Only the first separator splits off the epoch
        let version = v("1:2:3");
        assert_eq!(version.epoch(), 1);
        assert_eq!(version.bare(), "2:3");
    }

    #[test]
    fn test_version_parse_malformed() {
        assert!(matches!(
            Version::parse("a:1.0"),
            Err(Error::MalformedVersion { .. })
        ));
        assert!(matches!(
            Version::parse(":1.0"),
            Err(Error::MalformedVersion { .. })
        ));
        assert!(matches!(
            Version::parse("1:"),
            Err(Error::MalformedVersion { .. })
        ));
        assert!(matches!(Version::parse(""), Err(Error::MalformedVersion { .. })));
        assert!(matches!(
            Version::parse("-1:1.0"),
            Err(Error::MalformedVersion { .. })
        ));
    }

    #[test]
    fn test_epoch_function() {
        assert_eq!(epoch("3:0.1").unwrap(), 3);
        assert_eq!(epoch("0.1").unwrap(), 0);
        assert!(epoch("x:0.1").is_err());
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1:0.1") > v("0:99.9"));
        assert!(v("1:0.1") > v("99.9"));
        assert_eq!(compare("2:0", "1:999").unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_equal_despite_formatting() {
        assert_eq!(v("0:1.0"), v("1.0"));
        assert_eq!(v("1.0"), v("1.0-0"));
        assert_eq!(v("1.01"), v("1.1"));
        assert_eq!(compare("0:1.0", "1.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_dpkg_ordering() {
        assert!(v("1.0~rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0a"));
        assert!(v("1.0a") < v("1.0+"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.0-1") < v("1.0-2"));
        assert!(v("1.0-9") < v("1.0-10"));
        assert!(v("1.0~~") < v("1.0~"));
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("2.0-1") > v("1.9-99"));
    }

    #[test]
    fn test_compare_bare_ignores_epoch_semantics() {
        assert_eq!(compare_bare("0.1", "1.5"), Ordering::Less);
        assert_eq!(compare_bare("2.0", "1.5"), Ordering::Greater);
        assert_eq!(compare_bare("1.5", "1.5"), Ordering::Equal);
    }

    #[test]
    fn test_order_totality() {
        let samples = ["1:0.1", "0:99.9", "1.0", "0:1.0", "1.0~rc1", "2:0.1", "1:2.0-1"];
        for a in samples {
            for b in samples {
                let (a, b) = (v(a), v(b));
                let outcomes = [a < b, a == b, a > b];
                assert_eq!(outcomes.iter().filter(|o| **o).count(), 1);
                assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            }
        }
    }

    #[test]
    fn test_with_epoch() {
        let bumped = v("1.5").with_epoch(2);
        assert_eq!(bumped.epoch(), 2);
        assert_eq!(bumped.bare(), "1.5");
        assert_eq!(bumped.to_string(), "2:1.5");
    }

    #[test]
    fn test_display_keeps_input() {
        assert_eq!(v("0:1.0").to_string(), "0:1.0");
        assert_eq!(v("1.0-1").to_string(), "1.0-1");
    }
}
