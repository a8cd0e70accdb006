//! Handlers for the `/courses` resource.
//!
//! Courses are owned by their instructor. Write operations require the
//! instructor role and ownership of the course (admins bypass ownership).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use riffline_core::error::CoreError;
use riffline_core::roles::ROLE_ADMIN;
use riffline_core::types::DbId;
use riffline_db::models::course::{Course, CreateCourse, UpdateCourse};
use riffline_db::repositories::CourseRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListCoursesParams {
    /// When set by an instructor, list their own courses (including
    /// unpublished drafts) instead of the public catalog.
    #[serde(default)]
    pub mine: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a course and verify the caller may modify it.
async fn find_owned_course(
    state: &AppState,
    user: &crate::middleware::auth::AuthUser,
    course_id: DbId,
) -> AppResult<Course> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    if user.role != ROLE_ADMIN && course.instructor_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this course".into(),
        )));
    }

    Ok(course)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/courses
///
/// Public catalog of published courses. Admins see everything;
/// instructors can pass `?mine=true` to list their own courses, drafts
/// included.
pub async fn list_courses(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Query(params): Query<ListCoursesParams>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = match &user {
        Some(u) if params.mine => CourseRepo::list_by_instructor(&state.pool, u.user_id).await?,
        Some(u) if u.role == ROLE_ADMIN => CourseRepo::list(&state.pool, false).await?,
        _ => CourseRepo::list(&state.pool, true).await?,
    };

    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
///
/// Unpublished courses are visible only to their owner and admins; for
/// everyone else they do not exist.
pub async fn get_course(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;

    if !course.is_published {
        let can_see = user
            .as_ref()
            .is_some_and(|u| u.role == ROLE_ADMIN || u.user_id == course.instructor_id);
        if !can_see {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Course",
                id,
            }));
        }
    }

    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Course title must not be empty".into(),
        )));
    }
    if input.price_cents < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Course price must not be negative".into(),
        )));
    }

    let course = CourseRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(course_id = course.id, instructor_id = user.user_id, "Created course");

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    find_owned_course(&state, &user, id).await?;

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Course title must not be empty".into(),
            )));
        }
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;

    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/courses/{id}/publish
pub async fn publish_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    find_owned_course(&state, &user, id).await?;

    let course = CourseRepo::set_published(&state.pool, id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;

    tracing::info!(course_id = course.id, "Published course");
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
///
/// Deletes the course and, via the foreign key, all of its videos.
pub async fn delete_course(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_course(&state, &user, id).await?;

    let deleted = CourseRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }));
    }

    tracing::info!(course_id = id, "Deleted course");
    Ok(StatusCode::NO_CONTENT)
}
