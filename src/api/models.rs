use std::time::Duration;

use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Response from `/api/check-cookies`
#[derive(Debug, Clone, Deserialize)]
pub struct CookiesResponse {
    #[serde(default)]
    pub has_cookies: bool,
}

/// Response from `/api/is-busy`
#[derive(Debug, Clone, Deserialize)]
pub struct BusyResponse {
    #[serde(default)]
    pub busy: bool,
}

/// Error body the server attaches to rejected requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `/api/cancel`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CancelResponse {
    pub success: bool,
    pub message: Option<String>,
}

const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
const BASE_URL_ENV: &str = "YTDL_SERVER_URL";
const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Upper bound on one `/api/status` round trip. The poll loop waits for
    /// each answer before fetching again, so a stalled request must give up.
    pub status_timeout: Duration,
}

impl ApiConfig {
    /// Endpoint paths are joined relative to the base, so it always ends in `/`.
    pub fn with_base_url(base: &str) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        })
    }

    /// Reads the server location from `YTDL_SERVER_URL`, falling back to the
    /// local default.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) => Self::with_base_url(&value).unwrap_or_else(|e| {
                warn!("Ignoring {}={:?}: {}", BASE_URL_ENV, value, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL is valid"),
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}
