//! Provider abstraction over the Mux Video API.
//!
//! The ingest service and the API handlers depend on [`VideoProvider`]
//! rather than the concrete [`crate::client::MuxClient`], so tests can
//! substitute a fake without touching any global state.

use async_trait::async_trait;
use serde::Deserialize;

/// A newly created direct-upload session.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectUpload {
    /// Provider-issued upload session id.
    pub id: String,
    /// One-time URL the client PUTs video bytes to. Bytes never transit
    /// this service.
    pub url: String,
    /// Upload session status as reported by the provider.
    pub status: String,
    /// Asset id, present only once the provider has accepted the bytes.
    pub asset_id: Option<String>,
}

/// Current state of an existing upload session.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadDetail {
    pub id: String,
    pub status: String,
    pub asset_id: Option<String>,
}

/// One playback id attached to an asset.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackId {
    pub id: String,
    #[serde(default)]
    pub policy: Option<String>,
}

/// Authoritative asset detail fetched from the provider.
///
/// The webhook payload is not trusted for these fields; the reconciler
/// always re-fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDetail {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
}

impl AssetDetail {
    /// First playback id, if the asset has any.
    pub fn primary_playback_id(&self) -> Option<&str> {
        self.playback_ids.first().map(|p| p.id.as_str())
    }
}

/// Errors from the provider API layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The provider returned a non-2xx status code.
    #[error("Mux API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider returned a body we could not decode.
    #[error("Failed to decode Mux response: {0}")]
    Decode(String),
}

/// Operations the ingest flow needs from the video provider.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Create a direct-upload session with the given CORS origin.
    async fn create_direct_upload(&self, cors_origin: &str)
        -> Result<DirectUpload, ProviderError>;

    /// Fetch the current state of an upload session.
    async fn get_upload(&self, upload_id: &str) -> Result<UploadDetail, ProviderError>;

    /// Fetch authoritative asset detail.
    async fn get_asset(&self, asset_id: &str) -> Result<AssetDetail, ProviderError>;
}
