//! Download orchestration.
//!
//! A run is strictly sequential:
//! 1. exchange credentials for a token
//! 2. fetch the zone catalog
//! 3. resolve the selection (a bad selection fails here, before any download)
//! 4. create the output directory
//! 5. run the zone file pipeline for each resolved location, in catalog order
//!
//! The first failing zone stops the run. Zones completed before it stay on disk.


use crate::catalog::resolve_selection;
use crate::client::CzdsClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DownloadRequest, Event, ZoneDownload};
use tracing::{info, warn};

/// Capacity of the event channel; slow subscribers lag rather than block a run
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Entry point for downloading zone files
///
/// Holds no state between runs besides the HTTP client; each call to
/// [`run`](Self::run) authenticates and fetches the catalog afresh.
#[derive(Clone)]
pub struct ZoneDownloader {
    client: CzdsClient,
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl ZoneDownloader {
    /// Create a downloader from configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_client(CzdsClient::new(config)?))
    }

    /// Create a downloader around an existing client
    pub fn with_client(client: CzdsClient) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { client, event_tx }
    }

    /// The underlying client, for callers that need individual steps
    pub fn client(&self) -> &CzdsClient {
        &self.client
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Download the requested zones
    ///
    /// Returns one [`ZoneDownload`] per written file, in download order.
    ///
    /// # Errors
    ///
    /// Any error aborts the run: authentication, catalog, selection and
    /// directory errors before the first download; download, disposition and
    /// pipeline errors for the zone being processed.
    pub async fn run(&self, request: &DownloadRequest) -> Result<Vec<ZoneDownload>> {
        let token = self.client.authenticate(&request.credentials).await?;
        self.emit_event(Event::Authenticated);

        let catalog = self.client.fetch_catalog(&token).await?;
        self.emit_event(Event::CatalogFetched {
            total: catalog.len(),
        });

        let selected = resolve_selection(request.zones.as_slice(), &catalog)?;
        info!(
            selected = selected.len(),
            available = catalog.len(),
            mode = ?request.mode,
            "resolved zone selection"
        );

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory '{}': {}",
                        request.output_dir.display(),
                        e
                    ),
                ))
            })?;

        let mut completed = Vec::with_capacity(selected.len());
        for location in &selected {
            self.emit_event(Event::ZoneStarted {
                zone: location.zone().to_string(),
                url: location.to_string(),
            });

            match self
                .client
                .download_zone(&token, location, &request.output_dir, request.mode)
                .await
            {
                Ok(download) => {
                    self.emit_event(Event::ZoneComplete {
                        zone: download.zone.clone(),
                        path: download.path.clone(),
                        bytes_written: download.bytes_written,
                    });
                    completed.push(download);
                }
                Err(e) => {
                    warn!(
                        zone = location.zone(),
                        url = %location,
                        error = %e,
                        "zone download failed, stopping"
                    );
                    self.emit_event(Event::ZoneFailed {
                        zone: location.zone().to_string(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        info!(zones = completed.len(), "all zones downloaded");
        Ok(completed)
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
