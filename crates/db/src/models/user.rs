//! User entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
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
    pub role_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub school_id: Option<DbId>,
    pub approval_status: String,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub student_id: Option<String>,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    /// Resolved role name (e.g. `"lecturer"`, `"system_admin"`).
    pub role: String,
    pub role_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub school_id: Option<DbId>,
    pub approval_status: String,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub student_id: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub school_id: Option<DbId>,
    pub approval_status: String,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub student_id: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub school_id: Option<DbId>,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub student_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Filter for the admin user listing.
#[derive(Debug, Default)]
pub struct UserFilter {
    pub role_id: Option<DbId>,
    pub school_id: Option<DbId>,
    pub approval_status: Option<String>,
}
