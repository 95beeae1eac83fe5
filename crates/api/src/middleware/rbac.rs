//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level. School-level scoping (an HOD acting only
//! within their own school) is a handler concern on top of these.

use attenda_core::error::CoreError;
use attenda_core::roles::{is_hod_role, is_teaching_role, ROLE_SYSTEM_ADMIN};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `system_admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireSystemAdmin(user): RequireSystemAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be a system admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireSystemAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSystemAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_SYSTEM_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "System admin role required".into(),
            )));
        }
        Ok(RequireSystemAdmin(user))
    }
}

/// Requires `head_lecturer` or `system_admin`. Rejects with 403 otherwise.
pub struct RequireHod(pub AuthUser);

impl FromRequestParts<AppState> for RequireHod {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_hod_role(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Head lecturer or system admin role required".into(),
            )));
        }
        Ok(RequireHod(user))
    }
}

/// Requires any teaching role (`lecturer`, `head_lecturer`, or `system_admin`).
pub struct RequireLecturer(pub AuthUser);

impl FromRequestParts<AppState> for RequireLecturer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_teaching_role(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Lecturer role required".into(),
            )));
        }
        Ok(RequireLecturer(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
