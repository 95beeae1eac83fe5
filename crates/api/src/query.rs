//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use attenda_core::types::DbId;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Used by any handler that supports paginated listing. Values are clamped
/// via `clamp_limit` / `clamp_offset` before reaching the repository.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Query parameters for review-queue listings (`?status=&limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct ReviewQueueParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the admin user listing.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub school_id: Option<DbId>,
    pub approval_status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
