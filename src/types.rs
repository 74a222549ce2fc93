//! Core types for czds-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Account credentials exchanged for an [`AccessToken`]
///
/// Never persisted by the library. `Debug` output redacts the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token valid for the duration of one run
///
/// There is no refresh logic; the run is assumed to finish within the token's lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string, for the `Authorization` header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// What the pipeline writes for each zone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Write the compressed body as served
    #[default]
    Raw,
    /// Decompress and keep only the deduplicated delegated domain names
    DomainsOnly,
}

impl OutputMode {
    /// Mode for the `domains_only` flag
    pub fn from_domains_only(domains_only: bool) -> Self {
        if domains_only {
            OutputMode::DomainsOnly
        } else {
            OutputMode::Raw
        }
    }
}

/// Validated inputs for one [`ZoneDownloader::run`](crate::ZoneDownloader::run)
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// Account credentials
    pub credentials: Credentials,
    /// Directory receiving the zone files (created if missing)
    pub output_dir: PathBuf,
    /// Zones to download; empty means every zone in the catalog
    pub zones: Vec<String>,
    /// Output mode applied to every zone
    pub mode: OutputMode,
}

/// Summary of one completed zone
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDownload {
    /// Zone identifier (e.g. "com")
    pub zone: String,
    /// Location the zone was fetched from
    pub url: String,
    /// File that was written
    pub path: PathBuf,
    /// Bytes written to `path`
    pub bytes_written: u64,
    /// Number of domains emitted, in domains-only mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<u64>,
}

/// Event emitted while a run progresses
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Credentials were exchanged for a token
    Authenticated,

    /// The zone catalog was fetched
    CatalogFetched {
        /// Number of locations in the catalog
        total: usize,
    },

    /// A zone download started
    ZoneStarted {
        /// Zone identifier
        zone: String,
        /// Location being fetched
        url: String,
    },

    /// A zone file was fully written
    ZoneComplete {
        /// Zone identifier
        zone: String,
        /// File that was written
        path: PathBuf,
        /// Bytes written
        bytes_written: u64,
    },

    /// A zone download failed; the run stops here
    ZoneFailed {
        /// Zone identifier
        zone: String,
        /// Error message
        error: String,
    },
}
