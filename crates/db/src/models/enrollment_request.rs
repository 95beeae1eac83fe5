//! Course enrollment request entity model.

use attenda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `course_enrollment_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentRequest {
    pub id: DbId,
    pub course_id: DbId,
    pub student_id: DbId,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrollment request joined with course and student info for review lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentRequestWithContext {
    pub id: DbId,
    pub course_id: DbId,
    pub course_code: String,
    pub course_name: String,
    pub school_id: DbId,
    pub student_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// Request body for rejecting (reviewer notes).
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}
