use std::sync::Arc;

use riffline_mux::provider::VideoProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: riffline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Video provider client. `None` when Mux credentials are not
    /// configured -- endpoints that need the provider then report the
    /// missing configuration instead of panicking.
    pub provider: Option<Arc<dyn VideoProvider>>,
    /// Webhook signing secret. `None` disables signature verification
    /// (development-mode bypass; see `riffline_mux::webhook`).
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// The provider client, or an upstream-configuration error for
    /// endpoints that cannot proceed without it.
    pub fn provider(&self) -> Result<&dyn VideoProvider, crate::error::AppError> {
        self.provider.as_deref().ok_or_else(|| {
            crate::error::AppError::Core(riffline_core::error::CoreError::Upstream(
                "Mux is not configured. Set MUX_TOKEN_ID and MUX_TOKEN_SECRET.".into(),
            ))
        })
    }
}
