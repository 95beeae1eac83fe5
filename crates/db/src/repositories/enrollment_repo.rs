//! Repository for the `course_enrollments` table.

use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{CourseEnrollment, RosterEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, student_id, enrolled_at, created_at, updated_at";

/// Provides operations for course enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a student in a course, returning the created row.
    ///
    /// A duplicate enrollment violates
    /// `uq_course_enrollments_course_student` (mapped to 409 upstream).
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<CourseEnrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_enrollments (course_id, student_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseEnrollment>(&query)
            .bind(course_id)
            .bind(student_id)
            .fetch_one(pool)
            .await
    }

    /// Whether a student is enrolled in a course.
    pub async fn exists(
        pool: &PgPool,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM course_enrollments
                WHERE course_id = $1 AND student_id = $2
             )",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    /// Number of students enrolled in a course.
    pub async fn count_for_course(pool: &PgPool, course_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    /// The course roster: enrolled students with profile info, by last name.
    pub async fn roster(pool: &PgPool, course_id: DbId) -> Result<Vec<RosterEntry>, sqlx::Error> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT e.student_id, u.first_name, u.last_name, u.email,
                    u.student_id AS student_number, e.enrolled_at
             FROM course_enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1
             ORDER BY u.last_name ASC, u.first_name ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Remove a student from a course. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM course_enrollments WHERE course_id = $1 AND student_id = $2")
                .bind(course_id)
                .bind(student_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
