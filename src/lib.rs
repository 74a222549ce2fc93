//! # czds-dl
//!
//! Download DNS zone files from the ICANN Centralized Zone Data Service (CZDS).
//!
//! A run exchanges account credentials for a bearer token, fetches the list
//! of zones the account may download, checks the requested selection against
//! it, and streams each zone file to disk, either as served (gzip) or reduced
//! to a deduplicated list of delegated domain names.
//!
//! ## Quick Start
//!
//! ```no_run
//! use czds_dl::{Config, Credentials, DownloadRequest, OutputMode, ZoneDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ZoneDownloader::new(Config::default())?;
//!
//!     let request = DownloadRequest {
//!         credentials: Credentials::new("user@example.com", "secret"),
//!         output_dir: "zones".into(),
//!         zones: vec!["com".to_string(), "net".to_string()],
//!         mode: OutputMode::DomainsOnly,
//!     };
//!
//!     for zone in downloader.run(&request).await? {
//!         println!("{} -> {}", zone.zone, zone.path.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Credential exchange
pub mod auth;
/// Zone catalog and selection resolution
pub mod catalog;
/// HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Content-disposition parsing
pub mod disposition;
/// Download orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Delegated domain extraction
pub mod extract;
/// Zone file pipeline
pub mod pipeline;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use catalog::{ZoneLocation, resolve_selection};
pub use client::CzdsClient;
pub use config::{Config, HttpConfig};
pub use downloader::ZoneDownloader;
pub use error::{AuthError, DispositionError, Error, PipelineStage, Result};
pub use extract::DomainExtractor;
pub use types::{AccessToken, Credentials, DownloadRequest, Event, OutputMode, ZoneDownload};
