// src/history/snapshot.rs

//! HTTP client for the Debian snapshot archive
//!
//! Version histories come from the snapshot service's machine-readable API:
//! - `GET /mr/package/` lists every known source package
//! - `GET /mr/package/<name>/` lists every version ever archived for it
//! - `GET /mr/package/<name>/<version>/binpackages` lists the binaries it built
//! - `GET /mr/binary/<name>/` lists every archived version of a binary
//!
//! Dependency fields name binary packages, so summaries are keyed by binary
//! name and built from binary version histories.

use crate::error::{Error, Result};
use crate::version::Version;
use rayon::prelude::*;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Anything that can enumerate packages and their observed versions
pub trait HistorySource {
    /// All package names the source knows about
    fn packages(&self) -> Result<Vec<String>>;

    /// Every version observed for a package, duplicates allowed
    fn versions(&self, package: &str) -> Result<Vec<String>>;
}

/// The parts of the snapshot API that binary histories are built from
pub trait SnapshotApi: Sync {
    fn source_packages(&self) -> Result<Vec<String>>;
    fn source_versions(&self, source: &str) -> Result<Vec<String>>;
    /// Binary packages built by one source version
    fn binary_packages(&self, source: &str, version: &str) -> Result<Vec<String>>;
    fn binary_versions(&self, binary: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct PackageList {
    result: Vec<PackageEntry>,
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    package: String,
}

#[derive(Debug, Deserialize)]
struct VersionList {
    result: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

#[derive(Debug, Deserialize)]
struct BinPackageList {
    result: Vec<BinPackageEntry>,
}

#[derive(Debug, Deserialize)]
struct BinPackageEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BinaryVersionList {
    result: Vec<BinaryVersionEntry>,
}

#[derive(Debug, Deserialize)]
struct BinaryVersionEntry {
    binary_version: String,
}

/// Blocking snapshot API client with retry support
pub struct SnapshotClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl SnapshotClient {
    /// Create a client for the snapshot service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("epoch-audit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
        })
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every package the snapshot service has archived
    pub fn list_packages(&self) -> Result<Vec<String>> {
        let url = format!("{}/mr/package/", self.base_url);
        info!("Fetching package list from {}", url);

        let list: PackageList = self.get_json(&url)?;
        info!("Snapshot service lists {} packages", list.result.len());
        Ok(list.result.into_iter().map(|p| p.package).collect())
    }

    /// List every archived version of a package
    pub fn package_versions(&self, package: &str) -> Result<Vec<String>> {
        let url = format!("{}/mr/package/{}/", self.base_url, package);
        debug!("Fetching version history from {}", url);

        let list: VersionList = self.get_json(&url)?;
        Ok(list.result.into_iter().map(|v| v.version).collect())
    }

    /// List the binaries a source version built
    pub fn binary_packages(&self, source: &str, version: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/mr/package/{}/{}/binpackages",
            self.base_url, source, version
        );
        debug!("Fetching binary list from {}", url);

        let list: BinPackageList = self.get_json(&url)?;
        Ok(list.result.into_iter().map(|b| b.name).collect())
    }

    /// List every archived version of a binary package
    pub fn binary_versions(&self, binary: &str) -> Result<Vec<String>> {
        let url = format!("{}/mr/binary/{}/", self.base_url, binary);
        debug!("Fetching binary history from {}", url);

        let list: BinaryVersionList = self.get_json(&url)?;
        Ok(list.result.into_iter().map(|b| b.binary_version).collect())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(Error::NotFoundError(format!("{url} (HTTP 404)")));
                    }
                    if !status.is_success() {
                        return Err(Error::DownloadError(format!("HTTP {status} from {url}")));
                    }

                    return response.json().map_err(|e| {
                        Error::DownloadError(format!("Failed to parse JSON from {url}: {e}"))
                    });
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        url, attempt, self.max_retries, e
                    );
                    thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                }
            }
        }
    }
}

impl SnapshotApi for SnapshotClient {
    fn source_packages(&self) -> Result<Vec<String>> {
        self.list_packages()
    }

    fn source_versions(&self, source: &str) -> Result<Vec<String>> {
        self.package_versions(source)
    }

    fn binary_packages(&self, source: &str, version: &str) -> Result<Vec<String>> {
        SnapshotClient::binary_packages(self, source, version)
    }

    fn binary_versions(&self, binary: &str) -> Result<Vec<String>> {
        SnapshotClient::binary_versions(self, binary)
    }
}

/// Binary package histories on top of the snapshot API
///
/// The package list is every binary built by the newest archived version of
/// each source package. Binaries dropped by an older source version are not
/// listed, but can still be seeded by name.
pub struct BinaryHistory<A> {
    api: A,
}

impl<A: SnapshotApi> BinaryHistory<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Binaries built by the newest version of `source`
    fn current_binaries(&self, source: &str) -> Result<Vec<String>> {
        let versions = match self.api.source_versions(source) {
            Ok(versions) => versions,
            Err(Error::NotFoundError(msg)) => {
                warn!("No versions for source {}: {}", source, msg);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let newest = versions
            .iter()
            .filter_map(|v| match Version::parse(v) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Ignoring version of {}: {}", source, e);
                    None
                }
            })
            .max();

        let Some(newest) = newest else {
            return Ok(Vec::new());
        };

        match self.api.binary_packages(source, newest.as_str()) {
            Ok(binaries) => Ok(binaries),
            Err(Error::NotFoundError(msg)) => {
                warn!("No binaries for {} {}: {}", source, newest, msg);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

impl<A: SnapshotApi> HistorySource for BinaryHistory<A> {
    fn packages(&self) -> Result<Vec<String>> {
        let sources = self.api.source_packages()?;
        info!("Listing binaries built by {} source packages", sources.len());

        let per_source = sources
            .par_iter()
            .map(|source| self.current_binaries(source))
            .collect::<Result<Vec<_>>>()?;

        let binaries: BTreeSet<String> = per_source.into_iter().flatten().collect();
        info!("Found {} binary packages", binaries.len());
        Ok(binaries.into_iter().collect())
    }

    fn versions(&self, package: &str) -> Result<Vec<String>> {
        self.api.binary_versions(package)
    }
}
