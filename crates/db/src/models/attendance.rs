//! Attendance record entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub method: String,
    pub status: String,
    pub checked_in_at: Option<Timestamp>,
    pub recorded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An attendance record joined with the student's name for session listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecordWithStudent {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub method: String,
    pub status: String,
    pub checked_in_at: Option<Timestamp>,
    pub recorded_by: Option<DbId>,
}

/// Internal DTO for inserting a check-in record.
#[derive(Debug)]
pub struct CreateAttendanceRecord {
    pub session_id: DbId,
    pub student_id: DbId,
    pub method: String,
    pub status: String,
    pub checked_in_at: Option<Timestamp>,
    pub recorded_by: Option<DbId>,
}

/// Request body for a student check-in.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// `"qr"` or `"ble"`.
    pub method: String,
    /// Submitted rotating code (QR check-ins).
    pub code: Option<String>,
    /// Observed beacon UID (BLE check-ins).
    pub beacon_uid: Option<String>,
}

/// Request body for a lecturer's manual mark.
#[derive(Debug, Deserialize)]
pub struct ManualMarkRequest {
    pub student_id: DbId,
    pub status: String,
}
