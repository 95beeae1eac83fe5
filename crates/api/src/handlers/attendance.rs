//! Handlers for attendance check-in, manual marking, and verification.
//!
//! Check-ins are classified against the session's attendance window: QR
//! arrivals become `verified` or `late`; BLE arrivals are recorded `pending`
//! until the lecturer confirms the proximity evidence. One record per
//! (session, student) is enforced by the database.

use attenda_core::attendance::{
    classify_checkin, validate_status, METHOD_BLE, METHOD_MANUAL, METHOD_QR, STATUS_PENDING,
};
use attenda_core::checkin_code;
use attenda_core::error::CoreError;
use attenda_core::roles::is_teaching_role;
use attenda_core::types::DbId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use attenda_db::models::attendance::{
    AttendanceRecord, AttendanceRecordWithStudent, CheckInRequest, CreateAttendanceRecord,
    ManualMarkRequest,
};
use attenda_db::repositories::{AttendanceRepo, BeaconRepo, EnrollmentRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_approved, load_caller};
use crate::handlers::class_sessions::{ensure_session_exists, ensure_session_manage};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLecturer;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sessions/{id}/check-in
///
/// Student self check-in with QR code or BLE proximity evidence.
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AttendanceRecord>>)> {
    if is_teaching_role(&auth.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Lecturers record attendance via manual marking".into(),
        )));
    }
    let caller = load_caller(&state.pool, &auth).await?;
    ensure_approved(&caller)?;

    let session = ensure_session_exists(&state.pool, id).await?;
    if !session.is_active() {
        return Err(AppError::Core(CoreError::Conflict(
            "Session has ended".into(),
        )));
    }

    if !EnrollmentRepo::exists(&state.pool, session.course_id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not enrolled in this course".into(),
        )));
    }

    let now = Utc::now();

    let status = match input.method.as_str() {
        METHOD_QR => {
            if !session.qr_code_active {
                return Err(AppError::Core(CoreError::Conflict(
                    "QR check-in is not enabled for this session".into(),
                )));
            }
            if let Some(expires_at) = session.qr_expires_at {
                if expires_at < now {
                    return Err(AppError::Core(CoreError::Conflict(
                        "QR code has expired".into(),
                    )));
                }
            }
            let code = input.code.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation("QR check-in requires a code".into()))
            })?;
            if !checkin_code::verify_code(&session.qr_secret, code, now) {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid or stale check-in code".into(),
                )));
            }
            classify_checkin(session.started_at, session.attendance_window_mins, now).to_string()
        }
        METHOD_BLE => {
            if !session.beacon_enabled {
                return Err(AppError::Core(CoreError::Conflict(
                    "BLE check-in is not enabled for this session".into(),
                )));
            }
            let reported_uid = input.beacon_uid.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "BLE check-in requires a beacon_uid".into(),
                ))
            })?;
            let beacon = BeaconRepo::find_for_course(&state.pool, session.course_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict("Course has no assigned beacon".into()))
                })?;
            if beacon.beacon_uid != reported_uid {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Reported beacon does not match the course's beacon".into(),
                )));
            }
            // Proximity alone is weaker evidence; held for lecturer review.
            STATUS_PENDING.to_string()
        }
        other => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Check-in method must be '{METHOD_QR}' or '{METHOD_BLE}', got '{other}'"
            ))));
        }
    };

    let create = CreateAttendanceRecord {
        session_id: id,
        student_id: auth.user_id,
        method: input.method.clone(),
        status,
        checked_in_at: Some(now),
        recorded_by: None,
    };

    // A duplicate check-in violates the (session, student) unique
    // constraint, surfacing as 409.
    let record = AttendanceRepo::create(&state.pool, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        session_id = id,
        method = %record.method,
        status = %record.status,
        "Student checked in"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/sessions/{id}/attendance
///
/// Lecturer's manual mark for a student: creates or corrects the record
/// with an explicit status.
pub async fn manual_mark(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<ManualMarkRequest>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    validate_status(&input.status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    if !EnrollmentRepo::exists(&state.pool, session.course_id, input.student_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Student is not enrolled in this course".into(),
        )));
    }

    let create = CreateAttendanceRecord {
        session_id: id,
        student_id: input.student_id,
        method: METHOD_MANUAL.to_string(),
        status: input.status.clone(),
        checked_in_at: Some(Utc::now()),
        recorded_by: Some(auth.user_id),
    };

    let record = AttendanceRepo::upsert_manual(&state.pool, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        session_id = id,
        student_id = input.student_id,
        status = %record.status,
        "Manual attendance mark"
    );

    Ok(Json(DataResponse { data: record }))
}

/// PATCH /api/v1/attendance/{id}/verify
///
/// Promote a `pending` BLE record: `verified` when the check-in fell inside
/// the attendance window, `late` otherwise.
pub async fn verify_record(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    let record = AttendanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AttendanceRecord",
            id,
        }))?;

    let session = ensure_session_exists(&state.pool, record.session_id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let new_status = classify_checkin(
        session.started_at,
        session.attendance_window_mins,
        record.checked_in_at.unwrap_or(session.started_at),
    );

    let updated = AttendanceRepo::verify_pending(&state.pool, id, new_status, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Record is not pending".into()))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        record_id = id,
        status = %updated.status,
        "Attendance record verified"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/sessions/{id}/attendance
///
/// The session's attendance sheet with student names.
pub async fn list_for_session(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceRecordWithStudent>>>> {
    let session = ensure_session_exists(&state.pool, id).await?;
    ensure_session_manage(&state, &auth, &session).await?;

    let records = AttendanceRepo::list_for_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: records }))
}
