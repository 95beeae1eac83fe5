//! Handlers for the school membership review workflow.
//!
//! HODs review requests for their own school only; a school mismatch is 403.
//! System admins are unscoped. Approval stamps the user's school link and
//! approval status atomically with the request transition.

use attenda_core::approval::validate_status;
use attenda_core::error::CoreError;
use attenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use attenda_core::roles::ROLE_SYSTEM_ADMIN;
use attenda_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::Json;

use attenda_db::models::enrollment_request::ReviewRequest;
use attenda_db::models::membership_request::{MembershipRequest, MembershipRequestWithContext};
use attenda_db::repositories::MembershipRequestRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_school_scope, load_caller};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHod;
use crate::query::ReviewQueueParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/membership-requests?status=&limit=&offset=
///
/// The caller's review queue: HODs see their own school's requests, system
/// admins see everything.
pub async fn list_requests(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Query(params): Query<ReviewQueueParams>,
) -> AppResult<Json<DataResponse<Vec<MembershipRequestWithContext>>>> {
    if let Some(status) = &params.status {
        validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let school_id = if auth.role == ROLE_SYSTEM_ADMIN {
        None
    } else {
        let caller = load_caller(&state.pool, &auth).await?;
        Some(caller.school_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("HOD has no school assigned".into()))
        })?)
    };

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let requests = MembershipRequestRepo::list_with_context(
        &state.pool,
        params.status.as_deref(),
        school_id,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/membership-requests/{id}/approve
///
/// Approve a pending request: the user joins the school and their account
/// becomes approved. A request that is no longer pending conflicts (409).
pub async fn approve_request(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<MembershipRequest>>> {
    ensure_review_access(&state, &auth, id).await?;

    let request = MembershipRequestRepo::approve(&state.pool, id, auth.user_id, input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is missing or already reviewed".into(),
            ))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = id,
        applicant_id = request.user_id,
        "Membership request approved"
    );

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/membership-requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<MembershipRequest>>> {
    ensure_review_access(&state, &auth, id).await?;

    let request = MembershipRequestRepo::reject(&state.pool, id, auth.user_id, input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is missing or already reviewed".into(),
            ))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = id,
        applicant_id = request.user_id,
        "Membership request rejected"
    );

    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether the caller may review this request (school scoping for HODs).
async fn ensure_review_access(state: &AppState, auth: &AuthUser, request_id: DbId) -> AppResult<()> {
    let request = MembershipRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MembershipRequest",
            id: request_id,
        }))?;
    ensure_school_scope(&state.pool, auth, request.school_id).await
}
