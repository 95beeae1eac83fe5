//! Route definitions for the review workflows (enrollment + membership).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{enrollment_requests, membership_requests, schools};
use crate::state::AppState;

/// Routes mounted at `/enrollment-requests`.
///
/// ```text
/// GET  /               -> list_requests
/// POST /{id}/approve   -> approve_request
/// POST /{id}/reject    -> reject_request
/// ```
pub fn enrollment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(enrollment_requests::list_requests))
        .route("/{id}/approve", post(enrollment_requests::approve_request))
        .route("/{id}/reject", post(enrollment_requests::reject_request))
}

/// Routes mounted at `/membership-requests`.
///
/// ```text
/// GET  /               -> list_requests
/// POST /{id}/approve   -> approve_request
/// POST /{id}/reject    -> reject_request
/// ```
pub fn membership_router() -> Router<AppState> {
    Router::new()
        .route("/", get(membership_requests::list_requests))
        .route("/{id}/approve", post(membership_requests::approve_request))
        .route("/{id}/reject", post(membership_requests::reject_request))
}

/// School-scoped membership self-service, merged into `/schools`.
///
/// ```text
/// POST /{id}/join  -> join_school
/// ```
pub fn school_join_router() -> Router<AppState> {
    Router::new().route("/{id}/join", post(schools::join_school))
}
