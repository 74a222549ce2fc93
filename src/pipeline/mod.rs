//! Zone file pipeline: one HTTP response body streamed to one destination file.
//!
//! ```text
//! raw:          body ──────────────────────────────────────────────────────► file
//! domains-only: body ─► gunzip ─► utf-8 decode ─► lines ─► DomainExtractor ─► file
//! ```
//!
//! Stages are driven by pulling the next body chunk only after everything
//! derived from the previous one has been written, so memory stays bounded by
//! one chunk plus one partial line regardless of zone size. The first failing
//! stage aborts the run with [`Error::Pipeline`]; the destination file may be
//! left partially written and must not be used.

mod stages;

use crate::catalog::ZoneLocation;
use crate::client::{CzdsClient, reason_phrase};
use crate::disposition::resolve_filename;
use crate::error::{DispositionError, Error, PipelineStage, Result};
use crate::extract::DomainExtractor;
use crate::types::{AccessToken, OutputMode, ZoneDownload};
use futures::{Stream, StreamExt};
use stages::{FileSink, GzipStage, LineSplitter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Length of the compression suffix stripped in domains-only mode (".gz")
const COMPRESSION_SUFFIX_LEN: usize = 3;

impl CzdsClient {
    /// Download one zone into `output_dir`
    ///
    /// The file name is taken from the response's content-disposition: as-is
    /// in [`OutputMode::Raw`], without its compression suffix in
    /// [`OutputMode::DomainsOnly`].
    ///
    /// # Errors
    ///
    /// - [`Error::Download`] on a non-2xx status
    /// - [`Error::EmptyBody`] when the response has no body
    /// - [`Error::Disposition`] when the file name cannot be determined
    /// - [`Error::Pipeline`] when any streaming stage fails
    pub async fn download_zone(
        &self,
        token: &AccessToken,
        location: &ZoneLocation,
        output_dir: &Path,
        mode: OutputMode,
    ) -> Result<ZoneDownload> {
        debug!(url = %location, ?mode, "downloading zone file");

        let response = self
            .http
            .get(location.url().clone())
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: location.to_string(),
                status: status.as_u16(),
                reason: reason_phrase(status),
            });
        }

        if has_no_body(&response) {
            return Err(Error::EmptyBody {
                url: location.to_string(),
            });
        }

        let disposition_error = |source: DispositionError| Error::Disposition {
            url: location.to_string(),
            source,
        };
        let filename = resolve_filename(response.headers().get(reqwest::header::CONTENT_DISPOSITION))
            .map_err(disposition_error)?;
        let path = destination_path(output_dir, &filename, mode).map_err(disposition_error)?;

        let mut sink = FileSink::create(&path).await?;
        let body = std::pin::pin!(response.bytes_stream());
        let domains = match mode {
            OutputMode::Raw => {
                copy_body(body, &mut sink).await?;
                None
            }
            OutputMode::DomainsOnly => Some(extract_domains(body, &mut sink).await?),
        };
        let bytes_written = sink.finish().await?;

        info!(
            zone = location.zone(),
            path = %path.display(),
            bytes_written,
            "zone file written"
        );

        Ok(ZoneDownload {
            zone: location.zone().to_string(),
            url: location.to_string(),
            path,
            bytes_written,
            domains,
        })
    }
}

/// Destination of a zone file inside `output_dir`
///
/// Domains-only output drops the last three characters of the served name,
/// the compression extension (`com.zone.gz` becomes `com.zone`).
///
/// # Errors
///
/// Returns [`DispositionError::FilenameTooShort`] when nothing would remain
/// after stripping the suffix, and [`DispositionError::UnsafeFilename`] when
/// what remains is `.` or `..`.
pub fn destination_path(
    output_dir: &Path,
    filename: &str,
    mode: OutputMode,
) -> std::result::Result<PathBuf, DispositionError> {
    let name = match mode {
        OutputMode::Raw => filename,
        OutputMode::DomainsOnly => {
            let cut = filename
                .char_indices()
                .rev()
                .nth(COMPRESSION_SUFFIX_LEN - 1)
                .map(|(idx, _)| idx)
                .filter(|&idx| idx > 0)
                .ok_or_else(|| DispositionError::FilenameTooShort {
                    filename: filename.to_string(),
                })?;
            &filename[..cut]
        }
    };

    if name == "." || name == ".." {
        return Err(DispositionError::UnsafeFilename {
            filename: filename.to_string(),
        });
    }

    Ok(output_dir.join(name))
}

/// A success response with a null body status or a zero content length
fn has_no_body(response: &reqwest::Response) -> bool {
    matches!(
        response.status(),
        reqwest::StatusCode::NO_CONTENT | reqwest::StatusCode::RESET_CONTENT
    ) || response.content_length() == Some(0)
}

fn fetch_error(path: &Path, e: reqwest::Error) -> Error {
    Error::pipeline(PipelineStage::Fetch, path, std::io::Error::other(e))
}

/// Pipe the body to the sink unchanged
async fn copy_body<S, B>(mut body: S, sink: &mut FileSink) -> Result<()>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| fetch_error(sink.path(), e))?;
        sink.write(chunk.as_ref()).await?;
    }
    Ok(())
}

/// Run the domains-only chain, returning how many domains were written
async fn extract_domains<S, B>(mut body: S, sink: &mut FileSink) -> Result<u64>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let path = sink.path().to_path_buf();
    let decompress_error = |e: std::io::Error| Error::pipeline(PipelineStage::Decompress, &path, e);
    let decode_error = |e: std::str::Utf8Error| {
        Error::pipeline(
            PipelineStage::Decode,
            &path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    };

    let mut gzip = GzipStage::new();
    let mut lines = LineSplitter::new();
    let mut extractor = DomainExtractor::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| fetch_error(&path, e))?;
        let decompressed = gzip.push(chunk.as_ref()).map_err(decompress_error)?;
        lines.push(&decompressed);
        while let Some(line) = lines.next_line() {
            if let Some(domain) = extractor.process_line(line.map_err(decode_error)?) {
                sink.write(domain.as_bytes()).await?;
            }
        }
    }

    lines.push(&gzip.finish().map_err(decompress_error)?);
    while let Some(line) = lines.next_line() {
        if let Some(domain) = extractor.process_line(line.map_err(decode_error)?) {
            sink.write(domain.as_bytes()).await?;
        }
    }
    if let Some(line) = lines.finish()
        && let Some(domain) = extractor.process_line(line.map_err(decode_error)?)
    {
        sink.write(domain.as_bytes()).await?;
    }

    Ok(extractor.emitted())
}
