//! Handlers for class session lifecycle: start, end, QR and beacon toggles.
//!
//! A session's state is carried by `ended_at` (NULL = active). Ending is a
//! one-shot transition that also finalizes attendance.

use attenda_core::attendance::DEFAULT_WINDOW_MINS;
use attenda_core::checkin_code;
use attenda_core::error::CoreError;
use attenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use attenda_core::types::{DbId, Timestamp};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use attenda_db::models::class_session::{
    ClassSession, ClassSessionResponse, CreateClassSession, StartSessionRequest,
};
use attenda_db::repositories::{BeaconRepo, ClassSessionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::ensure_course_manage;
use crate::handlers::courses::ensure_course_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireLecturer};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /sessions/{id}/qr/enable`.
#[derive(Debug, Default, Deserialize)]
pub struct EnableQrRequest {
    /// Optional hard expiry; the rotating code stops validating after this.
    pub expires_at: Option<Timestamp>,
}

/// Response for `GET /sessions/{id}/qr`: the currently displayed code.
#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub code: String,
    /// Seconds until the displayed code rotates.
    pub rotates_in_secs: i64,
    pub expires_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{course_id}/sessions
///
/// Start a class session for a course. The session is active immediately and
/// carries a fresh QR secret (codes are served only while QR is enabled).
pub async fn start_session(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(course_id): Path<DbId>,
    Json(input): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ClassSessionResponse>>)> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let window = input.attendance_window_mins.unwrap_or(DEFAULT_WINDOW_MINS);
    if window < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "attendance_window_mins must not be negative".into(),
        )));
    }

    let create = CreateClassSession {
        course_id,
        instructor_id: auth.user_id,
        session_date: input
            .session_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        qr_secret: checkin_code::generate_secret(),
        attendance_window_mins: window,
    };

    let session = ClassSessionRepo::create(&state.pool, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        course_id = course_id,
        session_id = session.id,
        "Class session started"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: session.into(),
        }),
    ))
}

/// GET /api/v1/courses/{course_id}/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireAuth(_auth): RequireAuth,
    Path(course_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ClassSessionResponse>>>> {
    ensure_course_exists(&state.pool, course_id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let sessions = ClassSessionRepo::list_for_course(&state.pool, course_id, limit, offset).await?;
    let responses: Vec<ClassSessionResponse> =
        sessions.into_iter().map(ClassSessionResponse::from).collect();
    Ok(Json(DataResponse { data: responses }))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    RequireAuth(_auth): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: session.into(),
    }))
}

/// POST /api/v1/sessions/{id}/end
///
/// End an active session. Happens exactly once (409 on repeat); enrolled
/// students with no record are marked absent in the same transaction.
pub async fn end_session(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let ended = ClassSessionRepo::end_and_finalize(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Session already ended".into())))?;

    tracing::info!(user_id = auth.user_id, session_id = id, "Session ended");

    Ok(Json(DataResponse { data: ended.into() }))
}

/// POST /api/v1/sessions/{id}/qr/enable
pub async fn enable_qr(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<EnableQrRequest>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let updated = ClassSessionRepo::enable_qr(&state.pool, id, input.expires_at)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Session already ended".into())))?;

    tracing::info!(user_id = auth.user_id, session_id = id, "QR check-in enabled");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// POST /api/v1/sessions/{id}/qr/disable
pub async fn disable_qr(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let updated = ClassSessionRepo::disable_qr(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id,
        }))?;

    tracing::info!(user_id = auth.user_id, session_id = id, "QR check-in disabled");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// GET /api/v1/sessions/{id}/qr
///
/// The currently displayed rotating code. Only whoever manages the session
/// may read it (students receive it out-of-band, from the projector).
pub async fn current_qr_code(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QrCodeResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    if !session.qr_code_active {
        return Err(AppError::Core(CoreError::Conflict(
            "QR check-in is not enabled for this session".into(),
        )));
    }

    let now = Utc::now();
    let code = checkin_code::current_code(&session.qr_secret, now);
    let rotates_in_secs =
        checkin_code::ROTATION_SECS - now.timestamp().rem_euclid(checkin_code::ROTATION_SECS);

    Ok(Json(DataResponse {
        data: QrCodeResponse {
            code,
            rotates_in_secs,
            expires_at: session.qr_expires_at,
        },
    }))
}

/// POST /api/v1/sessions/{id}/beacon/enable
///
/// Enable BLE check-in. Requires the course to have an assigned beacon.
pub async fn enable_beacon(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    if BeaconRepo::find_for_course(&state.pool, session.course_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Course has no assigned beacon".into(),
        )));
    }

    let updated = ClassSessionRepo::set_beacon_enabled(&state.pool, id, true)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Session already ended".into())))?;

    tracing::info!(user_id = auth.user_id, session_id = id, "BLE check-in enabled");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// POST /api/v1/sessions/{id}/beacon/disable
pub async fn disable_beacon(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSessionResponse>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let updated = ClassSessionRepo::set_beacon_enabled(&state.pool, id, false)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Session already ended".into())))?;

    tracing::info!(user_id = auth.user_id, session_id = id, "BLE check-in disabled");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a session or fail with 404. Shared with attendance handlers.
pub async fn ensure_session_exists(pool: &PgPool, id: DbId) -> AppResult<ClassSession> {
    ClassSessionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id,
        }))
}

/// Whether the caller may manage this session (course-manage rules apply).
pub async fn ensure_session_manage(
    state: &AppState,
    auth: &AuthUser,
    session: &ClassSession,
) -> AppResult<()> {
    let course = ensure_course_exists(&state.pool, session.course_id).await?;
    ensure_course_manage(&state.pool, auth, &course).await
}
