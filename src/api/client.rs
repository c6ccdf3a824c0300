use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::{ApiConfig, BusyResponse, CancelResponse, CookiesResponse, ErrorResponse};
use crate::domain::{DownloadRequest, DownloadStatus};

const START_REJECTED: &str = "Failed to start the download";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.base_url.join(path)?)
    }

    /// Decodes a JSON body regardless of the HTTP status code. The server
    /// reports job failures in-band, sometimes with a 500.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    pub async fn check_cookies(&self) -> Result<bool> {
        let response = self.http.get(self.endpoint("api/check-cookies")?).send().await?;
        let body: CookiesResponse = Self::decode(response).await?;
        Ok(body.has_cookies)
    }

    pub async fn is_busy(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.endpoint("api/is-busy")?)
            .send()
            .await?
            .error_for_status()?;
        let body: BusyResponse = Self::decode(response).await?;
        Ok(body.busy)
    }

    /// Asks the server to start a job. Any non-2xx answer is a rejection,
    /// carrying the server's `error` text when it sent one.
    pub async fn start_download(&self, request: &DownloadRequest) -> Result<()> {
        debug!("POST api/download for {}", request.url);
        let response = self
            .http
            .post(self.endpoint("api/download")?)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body: ErrorResponse = response.json().await.unwrap_or_default();
        debug!("Download rejected with {}", status);
        Err(ApiError::Rejected(
            body.error.unwrap_or_else(|| START_REJECTED.to_string()),
        ))
    }

    pub async fn status(&self) -> Result<DownloadStatus> {
        let response = self
            .http
            .get(self.endpoint("api/status")?)
            .timeout(self.config.status_timeout)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn cancel(&self) -> Result<CancelResponse> {
        let response = self.http.post(self.endpoint("api/cancel")?).send().await?;
        Self::decode(response).await
    }
}
