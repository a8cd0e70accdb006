//! Route definitions for the `/courses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::course;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /               -> list (published only for anonymous/students)
/// POST   /               -> create (instructor/admin)
/// GET    /{id}           -> get
/// PUT    /{id}           -> update (owner/admin)
/// DELETE /{id}           -> delete (owner/admin, cascades videos)
/// POST   /{id}/publish   -> publish (owner/admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(course::list_courses).post(course::create_course),
        )
        .route(
            "/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        )
        .route("/{id}/publish", post(course::publish_course))
}
