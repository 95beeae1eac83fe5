//! School membership request entity model.

use attenda_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `school_membership_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MembershipRequest {
    pub id: DbId,
    pub school_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A membership request joined with applicant info for review lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MembershipRequestWithContext {
    pub id: DbId,
    pub school_id: DbId,
    pub school_name: String,
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
}
