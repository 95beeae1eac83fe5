//! Repository for the `course_enrollment_requests` table.
//!
//! Approval is a single transaction: the guarded status transition, the
//! enrollment insert, and the student notification commit together or not at
//! all. Repeat approval is idempotent -- exactly one enrollment row ever
//! exists per (course, student).

use attenda_core::approval::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::CourseEnrollment;
use crate::models::enrollment_request::{EnrollmentRequest, EnrollmentRequestWithContext};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, course_id, student_id, status, reviewed_by, reviewed_at, notes, created_at, updated_at";

/// Result of an approval attempt.
#[derive(Debug)]
pub enum ApproveOutcome {
    /// The request transitioned to approved; enrollment created (or already
    /// present from an earlier partial approval).
    Approved(CourseEnrollment),
    /// The request was already approved; no state changed.
    AlreadyApproved(CourseEnrollment),
    /// The request was already rejected; approval is not possible.
    AlreadyRejected,
}

/// Provides operations for course enrollment requests.
pub struct EnrollmentRequestRepo;

impl EnrollmentRequestRepo {
    /// File a pending request, returning the created row.
    ///
    /// A second open request for the same (course, student) violates
    /// `uq_enrollment_requests_pending` (mapped to 409 upstream).
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<EnrollmentRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_enrollment_requests (course_id, student_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EnrollmentRequest>(&query)
            .bind(course_id)
            .bind(student_id)
            .fetch_one(pool)
            .await
    }

    /// Find a request by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EnrollmentRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_enrollment_requests WHERE id = $1");
        sqlx::query_as::<_, EnrollmentRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests with course/student context for a reviewer.
    ///
    /// `instructor_id` scopes to courses taught by that user; `school_id`
    /// scopes to courses in that school. `NULL` binds match all rows.
    pub async fn list_with_context(
        pool: &PgPool,
        status: Option<&str>,
        instructor_id: Option<DbId>,
        school_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EnrollmentRequestWithContext>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentRequestWithContext>(
            "SELECT q.id, q.course_id, c.code AS course_code, c.name AS course_name,
                    c.school_id, q.student_id, u.first_name, u.last_name, u.email,
                    q.status, q.created_at
             FROM course_enrollment_requests q
             JOIN courses c ON c.id = q.course_id
             JOIN users u ON u.id = q.student_id
             WHERE ($1::text IS NULL OR q.status = $1)
               AND ($2::bigint IS NULL OR c.instructor_id = $2)
               AND ($3::bigint IS NULL OR c.school_id = $3)
             ORDER BY q.created_at ASC
             LIMIT $4 OFFSET $5",
        )
        .bind(status)
        .bind(instructor_id)
        .bind(school_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Approve a pending request.
    ///
    /// In one transaction: transition the request (`pending -> approved`,
    /// guarded so it happens exactly once), insert the enrollment with
    /// `ON CONFLICT DO NOTHING`, and notify the student. When the request
    /// was already approved this re-reads the existing enrollment and
    /// reports [`ApproveOutcome::AlreadyApproved`].
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<ApproveOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE course_enrollment_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), notes = $4
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        let transitioned = sqlx::query_as::<_, EnrollmentRequest>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(reviewer_id)
            .bind(notes)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let request = match transitioned {
            Some(request) => request,
            None => {
                // Not pending: resolve which terminal state we are in.
                tx.rollback().await?;
                let Some(existing) = Self::find_by_id(pool, id).await? else {
                    return Ok(None);
                };
                if existing.status == STATUS_REJECTED {
                    return Ok(Some(ApproveOutcome::AlreadyRejected));
                }
                let enrollment = find_enrollment(pool, existing.course_id, existing.student_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                return Ok(Some(ApproveOutcome::AlreadyApproved(enrollment)));
            }
        };

        sqlx::query(
            "INSERT INTO course_enrollments (course_id, student_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_course_enrollments_course_student DO NOTHING",
        )
        .bind(request.course_id)
        .bind(request.student_id)
        .execute(&mut *tx)
        .await?;

        let enrollment: CourseEnrollment = sqlx::query_as(
            "SELECT id, course_id, student_id, enrolled_at, created_at, updated_at
             FROM course_enrollments
             WHERE course_id = $1 AND student_id = $2",
        )
        .bind(request.course_id)
        .bind(request.student_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, body)
             VALUES ($1, 'enrollment_approved', 'Enrollment approved', $2)",
        )
        .bind(request.student_id)
        .bind(format!(
            "Your enrollment request for course {} was approved.",
            request.course_id
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(ApproveOutcome::Approved(enrollment)))
    }

    /// Reject a pending request and notify the student.
    ///
    /// Returns the updated request, or `None` when it is missing or no
    /// longer pending.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<EnrollmentRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE course_enrollment_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), notes = $4
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, EnrollmentRequest>(&query)
            .bind(id)
            .bind(STATUS_REJECTED)
            .bind(reviewer_id)
            .bind(notes)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, body)
             VALUES ($1, 'enrollment_rejected', 'Enrollment rejected', $2)",
        )
        .bind(request.student_id)
        .bind(format!(
            "Your enrollment request for course {} was rejected.",
            request.course_id
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(request))
    }
}

/// Fetch an enrollment outside a transaction (idempotent-approve path).
async fn find_enrollment(
    pool: &PgPool,
    course_id: DbId,
    student_id: DbId,
) -> Result<Option<CourseEnrollment>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, course_id, student_id, enrolled_at, created_at, updated_at
         FROM course_enrollments
         WHERE course_id = $1 AND student_id = $2",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}
