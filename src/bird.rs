use crate::Config;
use crate::error::ApiError;
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A resolved media lookup: the presigned URL plus the upstream payload it
/// was extracted from (kept for raw pass-through and response enrichment).
#[derive(Debug)]
pub struct ResolvedMedia {
    pub location: String,
    pub raw: Bytes,
    pub json: Value,
}

/// Thin client for the Bird.com media retrieval endpoint.
///
/// The access key is injected once at construction; handlers never read it
/// from ambient scope. A missing key is surfaced per-request as a
/// configuration error so the service can still start without it.
pub struct BirdClient {
    http: reqwest::Client,
    api_base: String,
    access_key: Option<String>,
    resolve_timeout: Duration,
    download_timeout: Duration,
}

impl BirdClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_base: config.bird_api_base.clone(),
            access_key: config.bird_access_key.clone(),
            resolve_timeout: Duration::from_secs(config.resolve_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }

    pub fn access_key_configured(&self) -> bool {
        self.access_key.is_some()
    }

    /// Resolve a presigned media URL for the given identifiers.
    ///
    /// Single attempt, no retries. Upstream failures keep their status code;
    /// transport failures and unexpected payloads map to 500-class errors.
    pub async fn resolve(
        &self,
        workspace_id: &str,
        message_id: &str,
        file_id: &str,
    ) -> Result<ResolvedMedia, ApiError> {
        let access_key = self.access_key.as_deref().ok_or(ApiError::Configuration)?;

        let url = format!(
            "{}/workspaces/{workspace_id}/messages/{message_id}/media/{file_id}",
            self.api_base
        );
        info!(%url, "Requesting Bird.com media endpoint");

        let response = self
            .http
            .get(&url)
            .query(&[("redirect", "false")])
            .header(AUTHORIZATION, format!("AccessKey {access_key}"))
            .timeout(self.resolve_timeout)
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        debug!(%status, "Bird.com response status");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            warn!(%status, "Bird.com returned an error status");
            return Err(ApiError::Upstream { status, body });
        }

        let raw = response.bytes().await.map_err(ApiError::Network)?;
        let json: Value = serde_json::from_slice(&raw).map_err(|_| ApiError::ResponseShape {
            response: Value::String(String::from_utf8_lossy(&raw).into_owned()),
        })?;

        let Some(location) = json.get("Location").and_then(Value::as_str).map(str::to_owned)
        else {
            warn!("Bird.com response is missing the Location field");
            return Err(ApiError::ResponseShape { response: json });
        };

        Ok(ResolvedMedia {
            location,
            raw,
            json,
        })
    }

    /// Open a streaming GET against a (presigned) media URL.
    pub async fn fetch_media(&self, media_url: &str) -> Result<reqwest::Response, ApiError> {
        info!(media_url, "Downloading media");

        let response = self
            .http
            .get(media_url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|error| ApiError::Download(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Download(format!(
                "media host returned status {status}"
            )));
        }

        Ok(response)
    }
}
