//! Handlers for school administration and membership self-service.
//!
//! CRUD is `system_admin`-only; `join` is open to any authenticated user.

use attenda_core::error::CoreError;
use attenda_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use attenda_db::models::membership_request::MembershipRequest;
use attenda_db::models::school::{CreateSchool, School, UpdateSchool};
use attenda_db::repositories::{MembershipRequestRepo, SchoolRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSystemAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/schools
///
/// Register a new school. The school code must be unique (409 otherwise).
pub async fn create_school(
    State(state): State<AppState>,
    RequireSystemAdmin(admin): RequireSystemAdmin,
    Json(input): Json<CreateSchool>,
) -> AppResult<(StatusCode, Json<DataResponse<School>>)> {
    if input.code.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "School code must not be empty".into(),
        )));
    }

    let school = SchoolRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = admin.user_id, school_id = school.id, code = %school.code, "School created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: school })))
}

/// GET /api/v1/admin/schools?include_inactive=
pub async fn list_schools(
    State(state): State<AppState>,
    RequireSystemAdmin(_admin): RequireSystemAdmin,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<School>>>> {
    let schools = SchoolRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: schools }))
}

/// GET /api/v1/admin/schools/{id}
pub async fn get_school(
    State(state): State<AppState>,
    RequireSystemAdmin(_admin): RequireSystemAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<School>>> {
    let school = SchoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "School",
            id,
        }))?;
    Ok(Json(DataResponse { data: school }))
}

/// PUT /api/v1/admin/schools/{id}
pub async fn update_school(
    State(state): State<AppState>,
    RequireSystemAdmin(_admin): RequireSystemAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSchool>,
) -> AppResult<Json<DataResponse<School>>> {
    let school = SchoolRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "School",
            id,
        }))?;
    Ok(Json(DataResponse { data: school }))
}

/// DELETE /api/v1/admin/schools/{id}
///
/// Hard-delete a school. Refused with 409 while users, courses, or beacons
/// still reference it.
pub async fn delete_school(
    State(state): State<AppState>,
    RequireSystemAdmin(admin): RequireSystemAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let dependents = SchoolRepo::dependent_count(&state.pool, id).await?;
    if dependents > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "School has {dependents} dependent records and cannot be deleted"
        ))));
    }

    let deleted = SchoolRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = admin.user_id, school_id = id, "School deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "School",
            id,
        }))
    }
}

/// POST /api/v1/schools/{id}/join
///
/// File a membership request for the caller. A second open request for the
/// same school conflicts (409).
pub async fn join_school(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<MembershipRequest>>)> {
    let school = SchoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "School",
            id,
        }))?;

    if !school.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "School is not accepting members".into(),
        )));
    }

    let request = MembershipRequestRepo::create(&state.pool, id, auth.user_id).await?;

    tracing::info!(user_id = auth.user_id, school_id = id, "Membership requested");

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}
