//! Repository for the `class_sessions` table.
//!
//! A session's lifecycle lives in `ended_at`: NULL while active, set exactly
//! once on end. Ending and attendance finalization (marking non-attendees
//! absent) are one transaction.

use attenda_core::attendance::{METHOD_MANUAL, STATUS_ABSENT};
use attenda_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::class_session::{ClassSession, CreateClassSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, instructor_id, session_date, started_at, ended_at, \
                       qr_code_active, qr_expires_at, qr_secret, beacon_enabled, \
                       attendance_window_mins, created_at, updated_at";

/// Provides lifecycle operations for class sessions.
pub struct ClassSessionRepo;

impl ClassSessionRepo {
    /// Start a new session (active immediately), returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClassSession,
    ) -> Result<ClassSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_sessions (course_id, instructor_id, session_date,
                                         qr_secret, attendance_window_mins)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(input.course_id)
            .bind(input.instructor_id)
            .bind(input.session_date)
            .bind(&input.qr_secret)
            .bind(input.attendance_window_mins)
            .fetch_one(pool)
            .await
    }

    /// Find a session by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClassSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM class_sessions WHERE id = $1");
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sessions for a course, most recent first.
    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ClassSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_sessions
             WHERE course_id = $1
             ORDER BY started_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(course_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// End an active session and finalize attendance in one transaction.
    ///
    /// The guarded UPDATE (`ended_at IS NULL`) makes the transition happen
    /// exactly once; a second call returns `None`. Every enrolled student
    /// without an attendance record receives an `absent` row before commit.
    pub async fn end_and_finalize(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClassSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE class_sessions
             SET ended_at = NOW(), qr_code_active = false, beacon_enabled = false
             WHERE id = $1 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(session) = session else {
            // Already ended (or missing); nothing to finalize.
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO attendance_records (session_id, student_id, method, status)
             SELECT $1, e.student_id, $3, $4
             FROM course_enrollments e
             WHERE e.course_id = $2
               AND NOT EXISTS (
                   SELECT 1 FROM attendance_records r
                   WHERE r.session_id = $1 AND r.student_id = e.student_id
               )",
        )
        .bind(id)
        .bind(session.course_id)
        .bind(METHOD_MANUAL)
        .bind(STATUS_ABSENT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Enable the QR code for an active session, with an optional expiry.
    ///
    /// Returns the updated row, or `None` if the session is missing or ended.
    pub async fn enable_qr(
        pool: &PgPool,
        id: DbId,
        expires_at: Option<Timestamp>,
    ) -> Result<Option<ClassSession>, sqlx::Error> {
        let query = format!(
            "UPDATE class_sessions SET qr_code_active = true, qr_expires_at = $2
             WHERE id = $1 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Disable the QR code.
    pub async fn disable_qr(pool: &PgPool, id: DbId) -> Result<Option<ClassSession>, sqlx::Error> {
        let query = format!(
            "UPDATE class_sessions SET qr_code_active = false, qr_expires_at = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Toggle BLE check-in for an active session.
    ///
    /// Returns the updated row, or `None` if the session is missing or ended.
    pub async fn set_beacon_enabled(
        pool: &PgPool,
        id: DbId,
        enabled: bool,
    ) -> Result<Option<ClassSession>, sqlx::Error> {
        let query = format!(
            "UPDATE class_sessions SET beacon_enabled = $2
             WHERE id = $1 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }
}
