pub mod auth;
pub mod courses;
pub mod health;
pub mod users;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                    register (public)
/// /auth/login                       login (public)
/// /auth/me                          profile (requires auth)
///
/// /users                            list (admin)
/// /users/{id}                       get, update profile
/// /users/{id}/password              change password (PATCH)
/// /users/{id}/subscription          set subscription state (PATCH, admin)
///
/// /courses                          list, create
/// /courses/{id}                     get, update, delete
/// /courses/{id}/publish             publish (POST)
///
/// /videos                           legacy create (POST)
/// /videos/course/{course_id}        list a course's videos (GET)
/// /videos/reorder                   bulk reorder (PATCH)
/// /videos/upload-url                Mux direct-upload session (POST)
/// /videos/webhook                   Mux webhook receiver (POST)
/// /videos/{id}                      get, update, delete
/// /videos/{id}/stats                instructor stats (GET)
/// /videos/{id}/status               playback status (GET)
/// /videos/{id}/sync                 manual Mux sync (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, me).
        .nest("/auth", auth::router())
        // Account management and admin subscription control.
        .nest("/users", users::router())
        // Course catalog and management.
        .nest("/courses", courses::router())
        // Video CRUD plus the Mux ingest surface.
        .nest("/videos", videos::router())
}
