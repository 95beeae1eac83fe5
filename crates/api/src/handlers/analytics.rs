//! Handlers for the `/analytics` resource.
//!
//! All figures are computed in SQL by `AnalyticsRepo`; access follows the
//! same management rules as the underlying resource.

use attenda_core::types::DbId;
use axum::extract::{Path, State};
use axum::Json;

use attenda_db::models::analytics::{CourseAnalytics, SchoolAnalytics, SessionAnalytics};
use attenda_db::repositories::AnalyticsRepo;

use crate::error::AppResult;
use crate::handlers::access::{ensure_course_manage, ensure_school_scope};
use crate::handlers::class_sessions::{ensure_session_exists, ensure_session_manage};
use crate::handlers::courses::ensure_course_exists;
use crate::middleware::rbac::{RequireHod, RequireLecturer};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/analytics/courses/{id}
///
/// Attendance aggregates for a course: sessions held, enrollment, per-status
/// counts, and the overall attendance rate.
pub async fn course_summary(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseAnalytics>>> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let summary = AnalyticsRepo::course_summary(&state.pool, id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/analytics/sessions/{id}
///
/// Per-status and per-method counts for one session.
pub async fn session_summary(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SessionAnalytics>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let summary = AnalyticsRepo::session_summary(&state.pool, id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/analytics/schools/{id}
///
/// School-wide overview: courses, people, beacon fleet health, and the
/// school's attendance rate. HODs see their own school only.
pub async fn school_overview(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SchoolAnalytics>>> {
    ensure_school_scope(&state.pool, &auth, id).await?;

    let overview = AnalyticsRepo::school_overview(&state.pool, id).await?;
    Ok(Json(DataResponse { data: overview }))
}
