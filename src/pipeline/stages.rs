//! Stage objects of the zone file pipeline.
//!
//! Each stage is fed by the one upstream of it and only holds what it has not
//! yet handed downstream: a partial gzip block, a partial line, or the write
//! buffer of the destination file.

use crate::error::{Error, PipelineStage, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Streaming gzip decompression
///
/// Accepts concatenated gzip members, as produced by parallel compressors.
pub(crate) struct GzipStage {
    decoder: flate2::write::MultiGzDecoder<Vec<u8>>,
}

impl GzipStage {
    pub(crate) fn new() -> Self {
        Self {
            decoder: flate2::write::MultiGzDecoder::new(Vec::new()),
        }
    }

    /// Feed compressed bytes, returning whatever could be decompressed so far
    pub(crate) fn push(&mut self, compressed: &[u8]) -> std::io::Result<Vec<u8>> {
        self.decoder.write_all(compressed)?;
        Ok(std::mem::take(self.decoder.get_mut()))
    }

    /// Signal end of input, returning the final decompressed bytes
    pub(crate) fn finish(self) -> std::io::Result<Vec<u8>> {
        self.decoder.finish()
    }
}

/// Splits decoded bytes into lines
///
/// Lines are yielded without their `\n` (or `\r\n`) terminator and decoded as
/// UTF-8 one at a time.
#[derive(Default)]
pub(crate) struct LineSplitter {
    buf: Vec<u8>,
    pos: usize,
}

impl LineSplitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line, if one is buffered
    pub(crate) fn next_line(&mut self) -> Option<std::result::Result<&str, std::str::Utf8Error>> {
        let start = self.pos;
        let len = self.buf[start..].iter().position(|&b| b == b'\n')?;
        self.pos = start + len + 1;
        Some(decode_line(&self.buf[start..start + len]))
    }

    /// Trailing line without a terminator, once input is exhausted
    pub(crate) fn finish(&mut self) -> Option<std::result::Result<&str, std::str::Utf8Error>> {
        let start = self.pos;
        self.pos = self.buf.len();
        if start == self.buf.len() {
            return None;
        }
        Some(decode_line(&self.buf[start..]))
    }
}

fn decode_line(line: &[u8]) -> std::result::Result<&str, std::str::Utf8Error> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    std::str::from_utf8(line)
}

/// Buffered destination file that counts what it writes
pub(crate) struct FileSink {
    writer: BufWriter<tokio::fs::File>,
    path: PathBuf,
    bytes_written: u64,
}

impl FileSink {
    /// Create (or truncate) the destination file
    pub(crate) async fn create(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| Error::pipeline(PipelineStage::Write, path, e))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            bytes_written: 0,
        })
    }

    pub(crate) async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(|e| Error::pipeline(PipelineStage::Write, &self.path, e))?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush to disk, returning the number of bytes written
    pub(crate) async fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .await
            .map_err(|e| Error::pipeline(PipelineStage::Write, &self.path, e))?;
        self.writer
            .get_mut()
            .sync_all()
            .await
            .map_err(|e| Error::pipeline(PipelineStage::Write, &self.path, e))?;
        Ok(self.bytes_written)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn collect_lines(splitter: &mut LineSplitter) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = splitter.next_line() {
            lines.push(line.unwrap().to_string());
        }
        lines
    }

    #[test]
    fn gzip_stage_decodes_across_chunk_boundaries() {
        let compressed = gzip(b"com. 172800 IN NS a.gtld-servers.net.\n");
        let mut stage = GzipStage::new();
        let mut out = Vec::new();
        for chunk in compressed.chunks(3) {
            out.extend(stage.push(chunk).unwrap());
        }
        out.extend(stage.finish().unwrap());
        assert_eq!(out, b"com. 172800 IN NS a.gtld-servers.net.\n");
    }

    #[test]
    fn gzip_stage_decodes_concatenated_members() {
        let mut compressed = gzip(b"first\n");
        compressed.extend(gzip(b"second\n"));
        let mut stage = GzipStage::new();
        let mut out = stage.push(&compressed).unwrap();
        out.extend(stage.finish().unwrap());
        assert_eq!(out, b"first\nsecond\n");
    }

    #[test]
    fn gzip_stage_rejects_plain_text() {
        let mut stage = GzipStage::new();
        let result = stage
            .push(b"this is definitely not a gzip stream\n")
            .and_then(|_| stage.finish());
        assert!(result.is_err());
    }

    #[test]
    fn splitter_joins_partial_lines() {
        let mut splitter = LineSplitter::new();
        splitter.push(b"exam");
        assert!(splitter.next_line().is_none());
        splitter.push(b"ple.com. 1 IN NS a.\nnext");
        assert_eq!(collect_lines(&mut splitter), ["example.com. 1 IN NS a."]);
        splitter.push(b".com. 1 IN NS b.\r\n");
        assert_eq!(collect_lines(&mut splitter), ["next.com. 1 IN NS b."]);
        assert!(splitter.finish().is_none());
    }

    #[test]
    fn splitter_yields_unterminated_last_line() {
        let mut splitter = LineSplitter::new();
        splitter.push(b"a\n\nb");
        assert_eq!(collect_lines(&mut splitter), ["a", ""]);
        assert_eq!(splitter.finish().unwrap().unwrap(), "b");
        assert!(splitter.finish().is_none());
    }

    #[test]
    fn splitter_reports_invalid_utf8() {
        let mut splitter = LineSplitter::new();
        splitter.push(b"ok\n\xff\xfe\n");
        assert_eq!(splitter.next_line().unwrap().unwrap(), "ok");
        assert!(splitter.next_line().unwrap().is_err());
    }

    #[tokio::test]
    async fn sink_counts_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::create(&path).await.unwrap();
        sink.write(b"example.com\n").await.unwrap();
        sink.write(b"other.com\n").await.unwrap();
        assert_eq!(sink.finish().await.unwrap(), 22);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "example.com\nother.com\n"
        );
    }

    #[tokio::test]
    async fn sink_reports_write_stage_when_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        match FileSink::create(&path).await {
            Err(Error::Pipeline { stage, .. }) => assert_eq!(stage, PipelineStage::Write),
            Err(other) => panic!("expected pipeline error, got {other:?}"),
            Ok(_) => panic!("expected pipeline error"),
        }
    }
}
