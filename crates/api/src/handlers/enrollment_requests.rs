//! Handlers for the enrollment request review workflow.
//!
//! A request transitions out of `pending` exactly once. Approval is atomic
//! with the enrollment insert and student notification; repeating an
//! approval is idempotent and never yields a second enrollment.

use attenda_core::approval::validate_status;
use attenda_core::error::CoreError;
use attenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use attenda_core::roles::{is_hod_role, ROLE_SYSTEM_ADMIN};
use attenda_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::Json;

use attenda_db::models::enrollment::CourseEnrollment;
use attenda_db::models::enrollment_request::{
    EnrollmentRequest, EnrollmentRequestWithContext, ReviewRequest,
};
use attenda_db::repositories::{ApproveOutcome, EnrollmentRequestRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_course_manage, load_caller};
use crate::handlers::courses::ensure_course_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLecturer;
use crate::query::ReviewQueueParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/enrollment-requests?status=&limit=&offset=
///
/// The caller's review queue: lecturers see requests for their own courses,
/// HODs see their school's, system admins see everything.
pub async fn list_requests(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Query(params): Query<ReviewQueueParams>,
) -> AppResult<Json<DataResponse<Vec<EnrollmentRequestWithContext>>>> {
    if let Some(status) = &params.status {
        validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let (instructor_id, school_id) = if auth.role == ROLE_SYSTEM_ADMIN {
        (None, None)
    } else if is_hod_role(&auth.role) {
        let caller = load_caller(&state.pool, &auth).await?;
        let school_id = caller.school_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("HOD has no school assigned".into()))
        })?;
        (None, Some(school_id))
    } else {
        (Some(auth.user_id), None)
    };

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let requests = EnrollmentRequestRepo::list_with_context(
        &state.pool,
        params.status.as_deref(),
        instructor_id,
        school_id,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/enrollment-requests/{id}/approve
///
/// Approve a pending request. Idempotent: approving an already-approved
/// request returns the existing enrollment; an already-rejected request
/// conflicts (409).
pub async fn approve_request(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<CourseEnrollment>>> {
    ensure_review_access(&state, &auth, id).await?;

    let outcome = EnrollmentRequestRepo::approve(&state.pool, id, auth.user_id, input.notes.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EnrollmentRequest",
            id,
        }))?;

    let enrollment = match outcome {
        ApproveOutcome::Approved(enrollment) => {
            tracing::info!(
                user_id = auth.user_id,
                request_id = id,
                enrollment_id = enrollment.id,
                "Enrollment request approved"
            );
            enrollment
        }
        ApproveOutcome::AlreadyApproved(enrollment) => enrollment,
        ApproveOutcome::AlreadyRejected => {
            return Err(AppError::Core(CoreError::Conflict(
                "Request was already rejected".into(),
            )));
        }
    };

    Ok(Json(DataResponse { data: enrollment }))
}

/// POST /api/v1/enrollment-requests/{id}/reject
///
/// Reject a pending request with optional reviewer notes. A request that is
/// no longer pending conflicts (409).
pub async fn reject_request(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<EnrollmentRequest>>> {
    ensure_review_access(&state, &auth, id).await?;

    let request = EnrollmentRequestRepo::reject(&state.pool, id, auth.user_id, input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is missing or already reviewed".into(),
            ))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = id,
        "Enrollment request rejected"
    );

    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether the caller may review this request (course-manage rules on the
/// request's course).
async fn ensure_review_access(state: &AppState, auth: &AuthUser, request_id: DbId) -> AppResult<()> {
    let request = EnrollmentRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EnrollmentRequest",
            id: request_id,
        }))?;
    let course = ensure_course_exists(&state.pool, request.course_id).await?;
    ensure_course_manage(&state.pool, auth, &course).await
}
