//! Handlers for the `/beacons` resource.
//!
//! Beacon registration and fleet management is HOD-and-up, scoped to the
//! HOD's own school. The heartbeat endpoint accepts battery/signal reports
//! from any teaching role (the device bridge authenticates as one).

use attenda_core::beacon::validate_status;
use attenda_core::error::CoreError;
use attenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use attenda_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use attenda_db::models::beacon::{
    BeaconFilter, BeaconHeartbeat, BleBeacon, CreateBeacon, UpdateBeacon,
};
use attenda_db::repositories::BeaconRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::ensure_school_scope;
use crate::middleware::rbac::{RequireHod, RequireLecturer};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the beacon listing.
#[derive(Debug, Deserialize)]
pub struct BeaconListParams {
    pub school_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/beacons
///
/// Register a beacon. The beacon UID must be unique (409 otherwise).
pub async fn create_beacon(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Json(input): Json<CreateBeacon>,
) -> AppResult<(StatusCode, Json<DataResponse<BleBeacon>>)> {
    ensure_school_scope(&state.pool, &auth, input.school_id).await?;

    let beacon = BeaconRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        beacon_id = beacon.id,
        beacon_uid = %beacon.beacon_uid,
        "Beacon registered"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: beacon })))
}

/// GET /api/v1/beacons?school_id=&status=
pub async fn list_beacons(
    State(state): State<AppState>,
    RequireHod(_auth): RequireHod,
    Query(params): Query<BeaconListParams>,
) -> AppResult<Json<DataResponse<Vec<BleBeacon>>>> {
    if let Some(status) = &params.status {
        validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let filter = BeaconFilter {
        school_id: params.school_id,
        status: params.status.clone(),
    };
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let beacons = BeaconRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: beacons }))
}

/// GET /api/v1/beacons/{id}
pub async fn get_beacon(
    State(state): State<AppState>,
    RequireHod(_auth): RequireHod,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BleBeacon>>> {
    let beacon = BeaconRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))?;
    Ok(Json(DataResponse { data: beacon }))
}

/// PUT /api/v1/beacons/{id}
///
/// Update beacon metadata or status (e.g. mark as `maintenance` or `lost`).
pub async fn update_beacon(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBeacon>,
) -> AppResult<Json<DataResponse<BleBeacon>>> {
    if let Some(status) = &input.status {
        validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let existing = BeaconRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))?;
    ensure_school_scope(&state.pool, &auth, existing.school_id).await?;

    let beacon = BeaconRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))?;
    Ok(Json(DataResponse { data: beacon }))
}

/// DELETE /api/v1/beacons/{id}
///
/// Remove a beacon from the fleet. Refused with 409 while it is assigned to
/// a course.
pub async fn delete_beacon(
    State(state): State<AppState>,
    RequireHod(auth): RequireHod,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let beacon = BeaconRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))?;
    ensure_school_scope(&state.pool, &auth, beacon.school_id).await?;

    if beacon.assigned_course_id.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Beacon is assigned to a course; unassign it first".into(),
        )));
    }

    let deleted = BeaconRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = auth.user_id, beacon_id = id, "Beacon deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))
    }
}

/// POST /api/v1/beacons/{id}/heartbeat
///
/// Record a battery/signal report and bump `last_seen_at`.
pub async fn heartbeat(
    State(state): State<AppState>,
    RequireLecturer(_auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<BeaconHeartbeat>,
) -> AppResult<Json<DataResponse<BleBeacon>>> {
    if !(0..=100).contains(&input.battery_level) {
        return Err(AppError::Core(CoreError::Validation(
            "battery_level must be between 0 and 100".into(),
        )));
    }

    let beacon = BeaconRepo::heartbeat(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id,
        }))?;

    tracing::debug!(
        beacon_id = id,
        battery_level = input.battery_level,
        "Beacon heartbeat"
    );

    Ok(Json(DataResponse { data: beacon }))
}
