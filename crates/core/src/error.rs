use crate::types::DbId;

/// Domain-level error taxonomy shared by all crates.
///
/// The API layer maps each variant to a fixed HTTP status; see
/// `riffline-api`'s `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A provider-side failure (Mux unreachable, rate-limited, or returned
    /// malformed data). Not retried internally; the manual sync endpoint is
    /// the recovery path.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
