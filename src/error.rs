//! Error types for czds-dl
//!
//! Every failure is terminal for the current run. Variants carry the context
//! needed to act on them without digging through logs:
//! - HTTP status and reason phrase for rejected requests
//! - The full list of inaccessible zones for a bad selection
//! - The pipeline stage and destination path for streaming failures

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for czds-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for czds-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "auth_base_url")
        key: Option<String>,
    },

    /// Credential exchange failed
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// The zone catalog could not be fetched
    #[error("failed to get zone URLs: {status} {reason}")]
    Catalog {
        /// HTTP status code returned by the distribution service
        status: u16,
        /// Reason phrase for the status
        reason: String,
    },

    /// A catalog entry is not a usable download URL
    #[error("invalid zone location '{location}': {reason}")]
    InvalidLocation {
        /// The raw catalog entry
        location: String,
        /// Why it could not be used
        reason: String,
    },

    /// The requested zones are not all present in the catalog
    #[error("found inaccessible zones: '{}'", inaccessible.join("', '"))]
    Selection {
        /// Every requested zone missing from the catalog, in request order
        inaccessible: Vec<String>,
    },

    /// A zone file request was rejected
    #[error("failed to download zone file {url}: {status} {reason}")]
    Download {
        /// The zone location that was requested
        url: String,
        /// HTTP status code of the response
        status: u16,
        /// Reason phrase for the status
        reason: String,
    },

    /// A zone file response carried no body
    #[error("got empty body for {url}")]
    EmptyBody {
        /// The zone location that was requested
        url: String,
    },

    /// The content-disposition header of a zone file response is unusable
    #[error("unexpected content-disposition for {url}: {source}")]
    Disposition {
        /// The zone location that was requested
        url: String,
        /// What was wrong with the header
        #[source]
        source: DispositionError,
    },

    /// A stage of the zone file pipeline failed mid-stream
    #[error("{stage} failed for {}: {source}", path.display())]
    Pipeline {
        /// The stage that failed
        stage: PipelineStage,
        /// Destination file being written (may be left partially written)
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential exchange errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The account service answered with a non-success status
    #[error("{status} {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status
        reason: String,
    },

    /// The account service answered, but not with the success marker
    #[error("{message}")]
    Rejected {
        /// The message field of the response
        message: String,
    },

    /// The success response did not include a token
    #[error("response did not contain an access token")]
    MissingToken,
}

/// Content-disposition validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispositionError {
    /// Header absent
    #[error("header is missing")]
    Missing,

    /// Header present but not visible ASCII
    #[error("header is not valid ASCII")]
    NotAscii,

    /// Disposition type is something other than `attachment`
    #[error("disposition type is '{disposition_type}', expected 'attachment'")]
    NotAttachment {
        /// The type that was declared
        disposition_type: String,
    },

    /// No filename parameter
    #[error("no filename parameter")]
    MissingFilename,

    /// Filename would escape the output directory
    #[error("unsafe filename '{filename}'")]
    UnsafeFilename {
        /// The declared filename
        filename: String,
    },

    /// Filename has no room for a compression suffix to strip
    #[error("filename '{filename}' is too short to strip a compression suffix")]
    FilenameTooShort {
        /// The declared filename
        filename: String,
    },
}

/// Stage of the zone file pipeline, used to label streaming failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Reading the response body from the network
    Fetch,
    /// Gzip decompression
    Decompress,
    /// UTF-8 text decoding
    Decode,
    /// Creating or writing the destination file
    Write,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Decompress => "decompress",
            PipelineStage::Decode => "decode",
            PipelineStage::Write => "write",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Machine-readable error code (stable, snake_case)
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Authentication(_) => "authentication_error",
            Error::Catalog { .. } => "catalog_error",
            Error::InvalidLocation { .. } => "invalid_location",
            Error::Selection { .. } => "selection_error",
            Error::Download { .. } => "download_error",
            Error::EmptyBody { .. } => "empty_body",
            Error::Disposition { .. } => "disposition_error",
            Error::Pipeline { .. } => "pipeline_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
        }
    }

    pub(crate) fn pipeline(
        stage: PipelineStage,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Pipeline {
            stage,
            path: path.into(),
            source,
        }
    }
}
