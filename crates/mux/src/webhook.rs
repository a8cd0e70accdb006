//! Webhook signature verification and event decoding.
//!
//! Mux signs each delivery with a `Mux-Signature` header of the form
//! `t=<unix-seconds>,v1=<hex-hmac>`, where the HMAC-SHA256 is computed over
//! `"{t}.{raw_body}"` with the shared webhook secret. Verification is done
//! against the raw request bytes, before any JSON parsing.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age (and future skew) of a webhook timestamp, in
/// seconds. Bounds replay risk while tolerating clock skew and delivery
/// latency.
pub const REPLAY_WINDOW_SECS: i64 = 300;

/// Verify a webhook delivery.
///
/// Fails closed on a malformed header, a timestamp outside the replay
/// window, or an HMAC mismatch. When no secret is configured the check
/// degrades to accept-all: an explicit development-mode bypass, logged
/// loudly, never a production configuration.
pub fn verify_signature(raw_body: &[u8], header: &str, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        tracing::warn!("Mux webhook secret not configured; skipping signature verification");
        return true;
    };
    verify_signature_at(raw_body, header, secret, chrono::Utc::now().timestamp())
}

/// Verification against an explicit "now", so the replay window is testable.
fn verify_signature_at(raw_body: &[u8], header: &str, secret: &str, now_unix: i64) -> bool {
    let Some((timestamp, signature_hex)) = parse_signature_header(header) else {
        tracing::warn!("Malformed Mux signature header");
        return false;
    };

    if (now_unix - timestamp).abs() > REPLAY_WINDOW_SECS {
        tracing::warn!(
            timestamp,
            now = now_unix,
            "Mux webhook timestamp outside replay window"
        );
        return false;
    }

    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    // HMAC key length is unrestricted for SHA-256, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(raw_body);

    // Constant-time comparison; never a short-circuiting string equality.
    mac.verify_slice(&signature).is_ok()
}

/// Parse `t=<unix-seconds>,v1=<hex>` into its two parts.
fn parse_signature_header(header: &str) -> Option<(i64, &str)> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = Some(value.parse::<i64>().ok()?),
            "v1" => signature = Some(value),
            // Unknown scheme versions are ignored, not rejected.
            _ => {}
        }
    }

    Some((timestamp?, signature?))
}

/// Raw webhook body shape: an event type plus a loosely typed data object.
#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// A webhook event decoded once at the boundary into a closed set of
/// shapes. The reconciler never touches raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `video.asset.ready` -- the asset finished processing.
    AssetReady { asset_id: String },
    /// `video.asset.errored` -- provider-side processing failed.
    AssetErrored { asset_id: String },
    /// Any other event type. Acknowledged but not acted on.
    Ignored { event_type: String },
}

/// Decode a raw webhook body into a [`WebhookEvent`].
///
/// Returns `Err` with a human-readable message when the body is not valid
/// JSON or a recognized event is missing its asset id.
pub fn decode_event(raw_body: &[u8]) -> Result<WebhookEvent, String> {
    let envelope: WebhookEnvelope = serde_json::from_slice(raw_body)
        .map_err(|e| format!("invalid webhook body: {e}"))?;

    let asset_id_of = |data: &serde_json::Value| -> Result<String, String> {
        data.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| format!("event '{}' is missing data.id", envelope.event_type))
    };

    match envelope.event_type.as_str() {
        "video.asset.ready" => Ok(WebhookEvent::AssetReady {
            asset_id: asset_id_of(&envelope.data)?,
        }),
        "video.asset.errored" => Ok(WebhookEvent::AssetErrored {
            asset_id: asset_id_of(&envelope.data)?,
        }),
        _ => Ok(WebhookEvent::Ignored {
            event_type: envelope.event_type,
        }),
    }
}
