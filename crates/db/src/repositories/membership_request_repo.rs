//! Repository for the `school_membership_requests` table.
//!
//! Approval updates the request, the user's denormalized `school_id` /
//! `approval_status`, and the notification in one transaction.

use attenda_core::approval::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::membership_request::{MembershipRequest, MembershipRequestWithContext};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, school_id, user_id, status, reviewed_by, reviewed_at, notes, created_at, updated_at";

/// Provides operations for school membership requests.
pub struct MembershipRequestRepo;

impl MembershipRequestRepo {
    /// File a pending request, returning the created row.
    ///
    /// A second open request for the same (school, user) violates
    /// `uq_membership_requests_pending` (mapped to 409 upstream).
    pub async fn create(
        pool: &PgPool,
        school_id: DbId,
        user_id: DbId,
    ) -> Result<MembershipRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO school_membership_requests (school_id, user_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(school_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a request by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MembershipRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM school_membership_requests WHERE id = $1");
        sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests with school/applicant context for a reviewer.
    ///
    /// `school_id` scopes to one school (HOD view); `NULL` binds match all.
    pub async fn list_with_context(
        pool: &PgPool,
        status: Option<&str>,
        school_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MembershipRequestWithContext>, sqlx::Error> {
        sqlx::query_as::<_, MembershipRequestWithContext>(
            "SELECT q.id, q.school_id, s.name AS school_name, q.user_id,
                    u.first_name, u.last_name, u.email, u.role_id, q.status, q.created_at
             FROM school_membership_requests q
             JOIN schools s ON s.id = q.school_id
             JOIN users u ON u.id = q.user_id
             WHERE ($1::text IS NULL OR q.status = $1)
               AND ($2::bigint IS NULL OR q.school_id = $2)
             ORDER BY q.created_at ASC
             LIMIT $3 OFFSET $4",
        )
        .bind(status)
        .bind(school_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Approve a pending request.
    ///
    /// In one transaction: transition the request (`pending -> approved`,
    /// exactly once), stamp the user's `school_id` and `approval_status`,
    /// and notify. Returns `None` when the request is missing or no longer
    /// pending.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<MembershipRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE school_membership_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), notes = $4
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, MembershipRequest>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(reviewer_id)
            .bind(notes)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE users SET school_id = $2, approval_status = $3 WHERE id = $1")
            .bind(request.user_id)
            .bind(request.school_id)
            .bind(STATUS_APPROVED)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, body)
             VALUES ($1, 'membership_approved', 'School membership approved',
                     'Your school membership request was approved.')",
        )
        .bind(request.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Reject a pending request, stamp the user, and notify.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<MembershipRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE school_membership_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), notes = $4
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, MembershipRequest>(&query)
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

        sqlx::query("UPDATE users SET approval_status = $2 WHERE id = $1")
            .bind(request.user_id)
            .bind(STATUS_REJECTED)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, body)
             VALUES ($1, 'membership_rejected', 'School membership rejected',
                     'Your school membership request was rejected.')",
        )
        .bind(request.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(request))
    }
}
