//! Repository for the `attendance_records` table.
//!
//! The unique constraint `uq_attendance_records_session_student` enforces
//! one record per (session, student); a duplicate check-in surfaces as a
//! 23505 database error, which the HTTP layer maps to 409.

use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance::{
    AttendanceRecord, AttendanceRecordWithStudent, CreateAttendanceRecord,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, student_id, method, status, checked_in_at, \
                       recorded_by, created_at, updated_at";

/// Provides operations for attendance records.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Insert a check-in record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttendanceRecord,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records (session_id, student_id, method, status,
                                             checked_in_at, recorded_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(&input.method)
            .bind(&input.status)
            .bind(input.checked_in_at)
            .bind(input.recorded_by)
            .fetch_one(pool)
            .await
    }

    /// Insert or overwrite a manual mark for a student.
    ///
    /// Lecturers may correct an existing record, so this upserts on the
    /// (session, student) pair.
    pub async fn upsert_manual(
        pool: &PgPool,
        input: &CreateAttendanceRecord,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records (session_id, student_id, method, status,
                                             checked_in_at, recorded_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_attendance_records_session_student
             DO UPDATE SET method = EXCLUDED.method,
                           status = EXCLUDED.status,
                           recorded_by = EXCLUDED.recorded_by
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(&input.method)
            .bind(&input.status)
            .bind(input.checked_in_at)
            .bind(input.recorded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a record by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance_records WHERE id = $1");
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the record for a (session, student) pair.
    pub async fn find_for_student(
        pool: &PgPool,
        session_id: DbId,
        student_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE session_id = $1 AND student_id = $2"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(session_id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Promote a `pending` record to the given status, stamping the verifier.
    ///
    /// The guard on `status = 'pending'` makes verification happen at most
    /// once; returns `None` when the record is missing or not pending.
    pub async fn verify_pending(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
        verified_by: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET status = $2, recorded_by = $3
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(new_status)
            .bind(verified_by)
            .fetch_optional(pool)
            .await
    }

    /// List a session's records with student names, ordered by last name.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<AttendanceRecordWithStudent>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecordWithStudent>(
            "SELECT r.id, r.session_id, r.student_id, u.first_name, u.last_name, u.email,
                    r.method, r.status, r.checked_in_at, r.recorded_by
             FROM attendance_records r
             JOIN users u ON u.id = r.student_id
             WHERE r.session_id = $1
             ORDER BY u.last_name ASC, u.first_name ASC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }
}
