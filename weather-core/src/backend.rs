use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::model::{Coordinates, ErrorBody, WeatherPayload};

/// Message used when the backend fails without saying why.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request to weather backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather backend returned {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("failed to parse weather backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn by_city(&self, city: &str) -> Result<WeatherPayload, FetchError>;
    async fn by_coords(&self, coords: Coordinates) -> Result<WeatherPayload, FetchError>;
}

/// Client for the first-party `/api/weather` proxy.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(base_url).map_err(|e| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { base_url: parsed, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/weather/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "weather"]).extend(segments);
        }
        url
    }

    async fn get_payload(&self, url: Url) -> Result<WeatherPayload, FetchError> {
        tracing::debug!("GET {}", url);

        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!("Backend error body: {}", truncate_body(&body));
            let parsed: ErrorBody = serde_json::from_str(&body)?;
            return Err(FetchError::Backend {
                status,
                message: parsed.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn by_city(&self, city: &str) -> Result<WeatherPayload, FetchError> {
        self.get_payload(self.endpoint(&[city])).await
    }

    async fn by_coords(&self, coords: Coordinates) -> Result<WeatherPayload, FetchError> {
        let mut url = self.endpoint(&["coords"]);
        url.query_pairs_mut()
            .append_pair("lat", &coords.latitude.to_string())
            .append_pair("lon", &coords.longitude.to_string());

        self.get_payload(url).await
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
