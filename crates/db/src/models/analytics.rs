//! Aggregate result structs for the analytics endpoints.
//!
//! These are computed in SQL by `AnalyticsRepo`; the original dashboards
//! derived (or mocked) the same figures client-side.

use attenda_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Attendance aggregates for a single course.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseAnalytics {
    pub course_id: DbId,
    pub sessions_held: i64,
    pub enrolled_count: i64,
    pub verified_count: i64,
    pub pending_count: i64,
    pub late_count: i64,
    pub absent_count: i64,
    /// (verified + late) / (sessions_held * enrolled_count), 0.0 when empty.
    pub attendance_rate: f64,
}

/// Per-status and per-method counts for a single session.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionAnalytics {
    pub session_id: DbId,
    pub enrolled_count: i64,
    pub verified_count: i64,
    pub pending_count: i64,
    pub late_count: i64,
    pub absent_count: i64,
    pub ble_count: i64,
    pub qr_count: i64,
    pub manual_count: i64,
}

/// School-wide overview counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SchoolAnalytics {
    pub school_id: DbId,
    pub course_count: i64,
    pub student_count: i64,
    pub lecturer_count: i64,
    pub beacon_count: i64,
    pub low_battery_beacon_count: i64,
    pub sessions_held: i64,
    pub attendance_rate: f64,
}
