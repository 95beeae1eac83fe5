//! Route definitions for the `/analytics` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /courses/{id}   -> course_summary
/// GET /sessions/{id}  -> session_summary
/// GET /schools/{id}   -> school_overview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses/{id}", get(analytics::course_summary))
        .route("/sessions/{id}", get(analytics::session_summary))
        .route("/schools/{id}", get(analytics::school_overview))
}
