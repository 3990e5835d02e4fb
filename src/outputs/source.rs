//! Where manifests come from.
//!
//! [`ManifestSource`] is the seam between the cache and the network;
//! [`HttpSource`] is the production implementation.

use super::{OutputManifest, OutputSummary, OutputType};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// A failed manifest or summary fetch.
///
/// Cloneable so one failure can be handed to every caller that was
/// waiting on the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not a valid document: {reason}")]
    Decode { url: String, reason: String },
}

#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_summary(&self) -> Result<OutputSummary, FetchError>;

    async fn fetch_manifest(&self, output: OutputType) -> Result<OutputManifest, FetchError>;

    /// Base used to build each file's `url`.
    fn base_url(&self) -> &str;
}

/// Fetches `{base}/summary.json` and `{base}/{type}/manifest.json` over HTTP.
pub struct HttpSource {
    client: Client,
    base_url: String,
    summary: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, summary: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, summary, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        summary: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FetchError::Network {
                url: base_url.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            summary: summary.into(),
        })
    }

    pub fn manifest_url(&self, output: OutputType) -> String {
        format!("{}/{}/manifest.json", self.base_url, output.slug())
    }

    pub fn summary_url(&self) -> String {
        format!("{}/{}", self.base_url, self.summary)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Network {
                url: url.clone(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| FetchError::Network {
            url: url.clone(),
            reason: err.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode {
            url,
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    async fn fetch_summary(&self) -> Result<OutputSummary, FetchError> {
        self.get_json(self.summary_url()).await
    }

    async fn fetch_manifest(&self, output: OutputType) -> Result<OutputManifest, FetchError> {
        self.get_json(self.manifest_url(output)).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
