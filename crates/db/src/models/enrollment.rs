//! Course enrollment entity model.

use attenda_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `course_enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseEnrollment {
    pub id: DbId,
    pub course_id: DbId,
    pub student_id: DbId,
    pub enrolled_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A roster entry: an enrollment joined with the student's profile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RosterEntry {
    pub student_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_number: Option<String>,
    pub enrolled_at: Timestamp,
}
