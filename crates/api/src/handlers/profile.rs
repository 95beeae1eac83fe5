//! Handlers for the `/me` resource: the caller's own profile.

use attenda_core::error::CoreError;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use attenda_db::models::user::{UpdateUser, UserResponse};
use attenda_db::repositories::{RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::auth::build_user_response;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /me`. Role, school, and activation are admin-only
/// and deliberately absent here.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: build_user_response(&user, role),
    }))
}

/// PUT /api/v1/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let update = UpdateUser {
        first_name: input.first_name,
        last_name: input.last_name,
        department: input.department,
        ..Default::default()
    };

    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: build_user_response(&user, role),
    }))
}
