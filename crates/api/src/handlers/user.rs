//! Handlers for the `/users` resource.
//!
//! Profiles are self-service (a user edits their own record; admins may
//! edit anyone's). Listing users and changing subscription state are
//! admin-only operations -- there is no self-serve billing flow, an admin
//! activates subscriptions out of band.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use riffline_core::error::CoreError;
use riffline_core::roles::ROLE_ADMIN;
use riffline_core::types::{DbId, Timestamp};
use riffline_db::models::user::{UpdateProfile, UpdateSubscription, User, UserResponse};
use riffline_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Subscription states accepted by the admin endpoint. Matches the
/// `users.subscription_status` CHECK constraint.
const SUBSCRIPTION_STATUSES: &[&str] = &["none", "active", "canceled", "expired"];

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    /// Restrict the listing to one role (`student`, `instructor`, `admin`).
    pub role: Option<String>,
}

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request body for `PATCH /users/{id}/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for `PATCH /users/{id}/subscription`.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub subscription_status: String,
    pub subscription_expires_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a user record the caller may act on (their own, or any when the
/// caller is an admin).
async fn find_accessible_user(
    state: &AppState,
    caller: &AuthUser,
    user_id: DbId,
) -> AppResult<User> {
    if caller.role != ROLE_ADMIN && caller.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You may only access your own profile".into(),
        )));
    }

    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// List all accounts. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<ListUsersParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, params.role.as_deref()).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/{id}
///
/// A single profile. Own profile or admin.
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_accessible_user(&state, &caller, user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/{id}
///
/// Update profile fields (names only; email and role are immutable here).
/// Own profile or admin.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    find_accessible_user(&state, &caller, user_id).await?;

    for (field, value) in [
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
    ] {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "{field} cannot be empty"
                ))));
            }
        }
    }

    let user = UserRepo::update_profile(
        &state.pool,
        user_id,
        &UpdateProfile {
            first_name: input.first_name,
            last_name: input.last_name,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: user_id,
    }))?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// PATCH /api/v1/users/{id}/password
///
/// Change the account password. Own account only -- admins reset
/// passwords through support tooling, not this endpoint.
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    if caller.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You may only change your own password".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::Validation(
            "Current password is incorrect".into(),
        )));
    }

    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::set_password_hash(&state.pool, user_id, &password_hash).await?;

    tracing::info!(user_id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/users/{id}/subscription
///
/// Set a user's subscription state. Admin only; this is how accounts gain
/// (or lose) access to non-preview videos.
pub async fn update_subscription(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateSubscriptionRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if !SUBSCRIPTION_STATUSES.contains(&input.subscription_status.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid subscription status '{}'. Expected one of: {}",
            input.subscription_status,
            SUBSCRIPTION_STATUSES.join(", ")
        ))));
    }

    let user = UserRepo::update_subscription(
        &state.pool,
        user_id,
        &UpdateSubscription {
            subscription_status: input.subscription_status,
            subscription_expires_at: input.subscription_expires_at,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: user_id,
    }))?;

    tracing::info!(
        user_id,
        admin_id = admin.user_id,
        status = %user.subscription_status,
        "Updated subscription"
    );

    Ok(Json(DataResponse { data: user.into() }))
}
