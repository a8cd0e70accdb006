//! Route definitions for the `/users` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET   /                    -> list (admin)
/// GET   /{id}                -> get (own profile or admin)
/// PUT   /{id}                -> update profile (own profile or admin)
/// PATCH /{id}/password       -> change password (own account)
/// PATCH /{id}/subscription   -> set subscription state (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list_users))
        .route("/{id}", get(user::get_user).put(user::update_profile))
        .route("/{id}/password", patch(user::change_password))
        .route("/{id}/subscription", patch(user::update_subscription))
}
