//! Zone catalog: fetching the authorized download locations and resolving a
//! zone selection against them.

use crate::client::{CzdsClient, reason_phrase};
use crate::error::{Error, Result};
use crate::types::AccessToken;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

/// One downloadable zone in the catalog
///
/// The zone identifier is the last path segment of the URL without its
/// extension, so `.../czds/downloads/com.zone` identifies zone `com`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneLocation {
    url: Url,
    zone: String,
}

impl ZoneLocation {
    /// Parse a catalog entry
    ///
    /// # Errors
    /// Returns [`Error::InvalidLocation`] if the entry is not an absolute URL
    /// with a non-empty last path segment.
    pub fn parse(location: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidLocation {
            location: location.to_string(),
            reason,
        };

        let url = Url::parse(location).map_err(|e| invalid(e.to_string()))?;
        let segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| invalid("URL has no file name".to_string()))?;

        let decoded = urlencoding::decode(segment)
            .map_err(|e| invalid(format!("file name is not UTF-8: {e}")))?;
        let zone = Path::new(decoded.as_ref())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(decoded.as_ref())
            .to_string();

        Ok(Self { url, zone })
    }

    /// Zone identifier (e.g. "com")
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Download URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Display for ZoneLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl CzdsClient {
    /// Fetch the download locations the token is authorized for
    ///
    /// The list is returned as received: order is preserved and duplicates are kept.
    /// Entries that are not usable URLs are logged and skipped, so they can
    /// never be selected.
    ///
    /// # Errors
    ///
    /// - [`Error::Catalog`] on a non-2xx status
    /// - `Network`/`Serialization` for transport or JSON failures
    pub async fn fetch_catalog(&self, token: &AccessToken) -> Result<Vec<ZoneLocation>> {
        debug!("getting download URLs");

        let url = self.config.download_links_url()?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Catalog {
                status: status.as_u16(),
                reason: reason_phrase(status),
            });
        }

        let body = response.bytes().await?;
        let links: Vec<String> = serde_json::from_slice(&body)?;
        debug!(count = links.len(), "received download URLs");

        Ok(links
            .iter()
            .filter_map(|link| match ZoneLocation::parse(link) {
                Ok(location) => Some(location),
                Err(e) => {
                    warn!(location = %link, error = %e, "skipping invalid catalog entry");
                    None
                }
            })
            .collect())
    }
}

/// Resolve a zone selection against the catalog
///
/// An empty selection resolves to the whole catalog. Otherwise every catalog
/// entry whose zone is selected is returned, in catalog order; entries that
/// appear more than once in the catalog are returned more than once.
///
/// # Errors
///
/// Returns [`Error::Selection`] naming every selected zone absent from the
/// catalog, in selection order, if there is at least one.
pub fn resolve_selection<S: AsRef<str>>(
    selection: &[S],
    catalog: &[ZoneLocation],
) -> Result<Vec<ZoneLocation>> {
    let mut seen = HashSet::new();
    let selection: Vec<&str> = selection
        .iter()
        .map(AsRef::as_ref)
        .filter(|zone| seen.insert(*zone))
        .collect();

    let available: HashSet<&str> = catalog.iter().map(ZoneLocation::zone).collect();
    let inaccessible: Vec<String> = selection
        .iter()
        .filter(|zone| !available.contains(*zone))
        .map(|zone| zone.to_string())
        .collect();
    if !inaccessible.is_empty() {
        return Err(Error::Selection { inaccessible });
    }

    if selection.is_empty() {
        return Ok(catalog.to_vec());
    }

    Ok(catalog
        .iter()
        .filter(|location| seen.contains(location.zone()))
        .cloned()
        .collect())
}
