//! REST client for the Mux Video API.
//!
//! Wraps the `POST /video/v1/uploads`, `GET /video/v1/uploads/{id}` and
//! `GET /video/v1/assets/{id}` endpoints using [`reqwest`] with HTTP basic
//! auth (access token id / secret).

use async_trait::async_trait;
use serde::Deserialize;

use crate::provider::{AssetDetail, DirectUpload, ProviderError, UploadDetail, VideoProvider};

/// Default base URL for the Mux REST API.
const MUX_API_BASE: &str = "https://api.mux.com";

/// Mux credentials and webhook secret, loaded from the environment.
#[derive(Debug, Clone)]
pub struct MuxConfig {
    /// API access token id (`MUX_TOKEN_ID`).
    pub token_id: String,
    /// API access token secret (`MUX_TOKEN_SECRET`).
    pub token_secret: String,
    /// Webhook signing secret (`MUX_WEBHOOK_SECRET`). When absent the
    /// webhook verifier degrades to accept-all -- a development-mode
    /// bypass, never acceptable in production.
    pub webhook_secret: Option<String>,
}

impl MuxConfig {
    /// Load Mux configuration from environment variables.
    ///
    /// Returns `None` when `MUX_TOKEN_ID` / `MUX_TOKEN_SECRET` are not both
    /// set -- the deployment then runs without the provider pipeline
    /// (legacy-URL videos only), and endpoints that need Mux report the
    /// missing configuration instead of panicking at startup.
    pub fn from_env() -> Option<Self> {
        let token_id = std::env::var("MUX_TOKEN_ID").ok().filter(|s| !s.is_empty())?;
        let token_secret = std::env::var("MUX_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())?;
        let webhook_secret = std::env::var("MUX_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        Some(Self {
            token_id,
            token_secret,
            webhook_secret,
        })
    }
}

/// HTTP client for the Mux Video API.
pub struct MuxClient {
    client: reqwest::Client,
    base_url: String,
    token_id: String,
    token_secret: String,
}

/// Mux wraps every response body in a `{ "data": ... }` envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

impl MuxClient {
    /// Create a client from loaded credentials.
    pub fn new(config: &MuxConfig) -> Self {
        Self::with_base_url(config, MUX_API_BASE.to_string())
    }

    /// Create a client against a non-default base URL (test servers).
    pub fn with_base_url(config: &MuxConfig, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token_id: config.token_id.clone(),
            token_secret: config.token_secret.clone(),
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl VideoProvider for MuxClient {
    async fn create_direct_upload(
        &self,
        cors_origin: &str,
    ) -> Result<DirectUpload, ProviderError> {
        let body = serde_json::json!({
            "cors_origin": cors_origin,
            "new_asset_settings": {
                "playback_policy": ["public"],
            },
        });

        let response = self
            .client
            .post(format!("{}/video/v1/uploads", self.base_url))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let upload: DirectUpload = Self::parse_response(response).await?;
        tracing::info!(upload_id = %upload.id, status = %upload.status, "Created Mux direct upload");
        Ok(upload)
    }

    async fn get_upload(&self, upload_id: &str) -> Result<UploadDetail, ProviderError> {
        let response = self
            .client
            .get(format!("{}/video/v1/uploads/{upload_id}", self.base_url))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn get_asset(&self, asset_id: &str) -> Result<AssetDetail, ProviderError> {
        let response = self
            .client
            .get(format!("{}/video/v1/assets/{asset_id}", self.base_url))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Self::parse_response(response).await
    }
}
