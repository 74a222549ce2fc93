//! Configuration types for czds-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Path of the credential exchange endpoint on the account service
pub(crate) const AUTHENTICATE_PATH: &str = "/api/authenticate";

/// Path of the zone catalog endpoint on the distribution service
pub(crate) const DOWNLOAD_LINKS_PATH: &str = "/czds/downloads/links";

/// HTTP transport settings
///
/// Timeouts default to `None`, leaving the transport defaults in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent sent with every request (default: "czds-dl/<version>")
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total timeout per request, including the body of a zone download
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,

    /// Timeout for establishing a connection
    #[serde(default, with = "optional_duration_serde")]
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

/// Main configuration for [`ZoneDownloader`](crate::ZoneDownloader)
///
/// All fields have sensible defaults pointing at the production ICANN services.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the account service that issues access tokens
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    /// Base URL of the Centralized Zone Data Service
    #[serde(default = "default_czds_base_url")]
    pub czds_base_url: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_base_url: default_auth_base_url(),
            czds_base_url: default_czds_base_url(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Config pointing both services at the same base URL
    ///
    /// Handy for tests and for proxies that front both services.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            auth_base_url: base_url.clone(),
            czds_base_url: base_url,
            ..Default::default()
        }
    }

    /// URL of the credential exchange endpoint
    pub fn authenticate_url(&self) -> Result<Url> {
        join_endpoint(&self.auth_base_url, "auth_base_url", AUTHENTICATE_PATH)
    }

    /// URL of the zone catalog endpoint
    pub fn download_links_url(&self) -> Result<Url> {
        join_endpoint(&self.czds_base_url, "czds_base_url", DOWNLOAD_LINKS_PATH)
    }
}

/// Append `path` to the base URL's path, tolerating a trailing slash on the base
fn join_endpoint(base: &str, key: &str, path: &str) -> Result<Url> {
    let invalid = |message: String| Error::Config {
        message,
        key: Some(key.to_string()),
    };

    let mut url = Url::parse(base).map_err(|e| invalid(format!("invalid URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("'{base}' cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

fn default_auth_base_url() -> String {
    "https://account-api.icann.org".to_string()
}

fn default_czds_base_url() -> String {
    "https://czds-api.icann.org".to_string()
}

fn default_user_agent() -> String {
    concat!("czds-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_icann() {
        let config = Config::default();
        assert_eq!(
            config.authenticate_url().unwrap().as_str(),
            "https://account-api.icann.org/api/authenticate"
        );
        assert_eq!(
            config.download_links_url().unwrap().as_str(),
            "https://czds-api.icann.org/czds/downloads/links"
        );
        assert!(config.http.timeout.is_none());
        assert!(config.http.user_agent.starts_with("czds-dl/"));
    }

    #[test]
    fn trailing_slash_on_base_does_not_double_up() {
        let config = Config::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            config.authenticate_url().unwrap().as_str(),
            "http://127.0.0.1:8080/api/authenticate"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let config = Config::with_base_url("https://proxy.example/czds-proxy");
        assert_eq!(
            config.download_links_url().unwrap().as_str(),
            "https://proxy.example/czds-proxy/czds/downloads/links"
        );
    }

    #[test]
    fn invalid_base_url_names_the_key() {
        let config = Config {
            czds_base_url: "not a url".to_string(),
            ..Default::default()
        };
        match config.download_links_url() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("czds_base_url")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"czds_base_url": "http://localhost:9000", "http": {"timeout": 30}}"#)
                .expect("deserialize failed");
        assert_eq!(config.auth_base_url, "https://account-api.icann.org");
        assert_eq!(config.czds_base_url, "http://localhost:9000");
        assert_eq!(config.http.timeout, Some(Duration::from_secs(30)));
        assert!(config.http.connect_timeout.is_none());
    }
}
