//! Course entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub instructor_id: DbId,
    pub school_id: DbId,
    pub max_students: i32,
    /// Comma-separated day abbreviations, e.g. `"Mon,Wed"`.
    pub schedule_days: Option<String>,
    pub schedule_start_time: Option<NaiveTime>,
    pub schedule_end_time: Option<NaiveTime>,
    pub room: Option<String>,
    /// When set, students enroll via a pending request instead of directly.
    pub approval_required: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A course joined with its assigned beacon id (if any).
///
/// The beacon assignment lives on `ble_beacons.assigned_course_id`; this is
/// the read-side join the dashboards consume.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseWithBeacon {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub instructor_id: DbId,
    pub school_id: DbId,
    pub max_students: i32,
    pub schedule_days: Option<String>,
    pub schedule_start_time: Option<NaiveTime>,
    pub schedule_end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub approval_required: bool,
    pub is_active: bool,
    pub beacon_id: Option<DbId>,
    pub enrolled_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub code: String,
    pub name: String,
    pub instructor_id: DbId,
    pub school_id: DbId,
    pub max_students: Option<i32>,
    pub schedule_days: Option<String>,
    pub schedule_start_time: Option<NaiveTime>,
    pub schedule_end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub approval_required: Option<bool>,
}

/// DTO for updating an existing course. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourse {
    pub code: Option<String>,
    pub name: Option<String>,
    pub instructor_id: Option<DbId>,
    pub max_students: Option<i32>,
    pub schedule_days: Option<String>,
    pub schedule_start_time: Option<NaiveTime>,
    pub schedule_end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub approval_required: Option<bool>,
    pub is_active: Option<bool>,
}

/// Filter for course listings.
#[derive(Debug, Default)]
pub struct CourseFilter {
    pub school_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    pub include_inactive: bool,
}
