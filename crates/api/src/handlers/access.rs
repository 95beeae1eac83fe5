//! Shared authorization helpers used across handler modules.
//!
//! The RBAC extractors gate by role; these helpers add the ownership and
//! school-scoping rules on top: a lecturer manages only their own courses,
//! and an HOD acts only within their own school.

use attenda_core::approval::STATUS_APPROVED;
use attenda_core::error::CoreError;
use attenda_core::roles::ROLE_SYSTEM_ADMIN;
use attenda_core::types::DbId;
use attenda_db::models::course::Course;
use attenda_db::models::user::User;
use attenda_db::repositories::UserRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load the caller's user row, rejecting tokens for deleted accounts.
pub async fn load_caller(pool: &PgPool, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

/// Reject callers whose account has not been approved yet.
pub fn ensure_approved(user: &User) -> AppResult<()> {
    if user.approval_status != STATUS_APPROVED {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is not approved".into(),
        )));
    }
    Ok(())
}

/// Whether the caller may manage (mutate, review, inspect) a course.
///
/// Allowed for the course's instructor, an HOD of the course's school, and
/// system admins.
pub async fn ensure_course_manage(
    pool: &PgPool,
    auth: &AuthUser,
    course: &Course,
) -> AppResult<()> {
    if auth.role == ROLE_SYSTEM_ADMIN || course.instructor_id == auth.user_id {
        return Ok(());
    }
    let caller = load_caller(pool, auth).await?;
    if attenda_core::roles::is_hod_role(&auth.role) && caller.school_id == Some(course.school_id) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "Not permitted to manage this course".into(),
    )))
}

/// Whether the caller may act on records scoped to `school_id`.
///
/// System admins are unscoped; HODs must belong to the same school.
pub async fn ensure_school_scope(
    pool: &PgPool,
    auth: &AuthUser,
    school_id: DbId,
) -> AppResult<()> {
    if auth.role == ROLE_SYSTEM_ADMIN {
        return Ok(());
    }
    let caller = load_caller(pool, auth).await?;
    if caller.school_id == Some(school_id) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "Not permitted to act outside your own school".into(),
    )))
}
