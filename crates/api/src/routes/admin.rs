//! Route definitions for the `/admin` resource (user and school management).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin_users, schools};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `system_admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                     -> list_users
/// POST   /users                     -> create_user
/// GET    /users/{id}                -> get_user
/// PUT    /users/{id}                -> update_user
/// DELETE /users/{id}                -> deactivate_user
/// POST   /users/{id}/reset-password -> reset_password
///
/// GET    /schools                   -> list_schools
/// POST   /schools                   -> create_school
/// GET    /schools/{id}              -> get_school
/// PUT    /schools/{id}              -> update_school
/// DELETE /schools/{id}              -> delete_school
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(admin_users::list_users).post(admin_users::create_user),
        )
        .route(
            "/users/{id}",
            get(admin_users::get_user)
                .put(admin_users::update_user)
                .delete(admin_users::deactivate_user),
        )
        .route(
            "/users/{id}/reset-password",
            post(admin_users::reset_password),
        )
        .route(
            "/schools",
            get(schools::list_schools).post(schools::create_school),
        )
        .route(
            "/schools/{id}",
            get(schools::get_school)
                .put(schools::update_school)
                .delete(schools::delete_school),
        )
}
