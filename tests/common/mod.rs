//! Common test utilities: a fake CZDS deployment on a wiremock server

use czds_dl::{Config, Credentials, DownloadRequest, OutputMode, ZoneDownloader};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::Path;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token issued by the fake account service
pub const TOKEN: &str = "integration-token";

/// Gzip-compress a zone file body
pub fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Fake account and distribution services sharing one mock server
pub struct FakeCzds {
    pub server: MockServer,
}

impl FakeCzds {
    /// Start a server that accepts any credentials
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": TOKEN,
                "message": "Authentication Successful",
            })))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Download URL the catalog advertises for `zone`
    pub fn zone_url(&self, zone: &str) -> String {
        format!("{}/czds/downloads/{zone}.zone", self.server.uri())
    }

    /// Serve the catalog as the given list of URLs
    pub async fn catalog(&self, urls: &[String]) {
        Mock::given(method("GET"))
            .and(path("/czds/downloads/links"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(urls))
            .mount(&self.server)
            .await;
    }

    /// Serve `zone` as a gzip attachment named `<zone>.zone.gz`, expecting `hits` requests
    pub async fn zone(&self, zone: &str, content: &str, hits: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/czds/downloads/{zone}.zone")))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Content-Disposition",
                        format!(r#"attachment; filename="{zone}.zone.gz""#).as_str(),
                    )
                    .set_body_bytes(gzip(content)),
            )
            .expect(hits)
            .mount(&self.server)
            .await;
    }

    /// Downloader pointed at this server
    pub fn downloader(&self) -> ZoneDownloader {
        ZoneDownloader::new(Config::with_base_url(self.server.uri())).unwrap()
    }
}

/// Request with fixed test credentials
pub fn request(output_dir: &Path, zones: &[&str], mode: OutputMode) -> DownloadRequest {
    DownloadRequest {
        credentials: Credentials::new("tester@example.com", "secret"),
        output_dir: output_dir.to_path_buf(),
        zones: zones.iter().map(|zone| zone.to_string()).collect(),
        mode,
    }
}
