//! Role name constants.
//!
//! Roles are stored as plain strings on the `users` table and embedded in
//! JWT claims. Keep these in sync with the CHECK constraint in
//! `db/migrations/0001_users.sql`.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_ADMIN: &str = "admin";
