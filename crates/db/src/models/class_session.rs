//! Class session entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full class session row from the `class_sessions` table.
///
/// Contains the QR secret -- NEVER serialize this to API responses directly.
/// Use [`ClassSessionResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct ClassSession {
    pub id: DbId,
    pub course_id: DbId,
    pub instructor_id: DbId,
    pub session_date: NaiveDate,
    pub started_at: Timestamp,
    /// `None` while the session is active.
    pub ended_at: Option<Timestamp>,
    pub qr_code_active: bool,
    pub qr_expires_at: Option<Timestamp>,
    pub qr_secret: String,
    pub beacon_enabled: bool,
    pub attendance_window_mins: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClassSession {
    /// Whether the session is still accepting check-ins.
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Safe session representation for API responses (no QR secret).
#[derive(Debug, Clone, Serialize)]
pub struct ClassSessionResponse {
    pub id: DbId,
    pub course_id: DbId,
    pub instructor_id: DbId,
    pub session_date: NaiveDate,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub qr_code_active: bool,
    pub qr_expires_at: Option<Timestamp>,
    pub beacon_enabled: bool,
    pub attendance_window_mins: i32,
    pub created_at: Timestamp,
}

impl From<ClassSession> for ClassSessionResponse {
    fn from(s: ClassSession) -> Self {
        ClassSessionResponse {
            id: s.id,
            course_id: s.course_id,
            instructor_id: s.instructor_id,
            session_date: s.session_date,
            started_at: s.started_at,
            ended_at: s.ended_at,
            qr_code_active: s.qr_code_active,
            qr_expires_at: s.qr_expires_at,
            beacon_enabled: s.beacon_enabled,
            attendance_window_mins: s.attendance_window_mins,
            created_at: s.created_at,
        }
    }
}

/// DTO for starting a new class session.
#[derive(Debug)]
pub struct CreateClassSession {
    pub course_id: DbId,
    pub instructor_id: DbId,
    pub session_date: NaiveDate,
    pub qr_secret: String,
    pub attendance_window_mins: i32,
}

/// Request body for starting a session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub session_date: Option<NaiveDate>,
    pub attendance_window_mins: Option<i32>,
}
