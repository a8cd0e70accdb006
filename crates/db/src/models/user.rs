//! User entity model and DTOs.

use riffline_core::access;
use riffline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub subscription_status: String,
    pub subscription_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether this user currently holds an active subscription.
    pub fn has_active_subscription(&self) -> bool {
        access::has_active_subscription(
            &self.subscription_status,
            self.subscription_expires_at,
            chrono::Utc::now(),
        )
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub subscription_status: String,
    pub subscription_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            subscription_status: u.subscription_status,
            subscription_expires_at: u.subscription_expires_at,
            created_at: u.created_at,
        }
    }
}

/// DTO for inserting a new user. The password is already hashed by the
/// caller (the API layer owns argon2).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// DTO for updating profile fields. `None` leaves a field untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// DTO for updating subscription state.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscription {
    pub subscription_status: String,
    pub subscription_expires_at: Option<Timestamp>,
}
