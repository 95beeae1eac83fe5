//! Route definitions for the `/courses` resource and its sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{class_sessions, courses};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                       -> list_courses
/// POST   /                       -> create_course
/// GET    /{id}                   -> get_course
/// PUT    /{id}                   -> update_course
/// DELETE /{id}                   -> delete_course
/// GET    /{id}/roster            -> get_roster
/// POST   /{id}/beacon            -> assign_beacon
/// DELETE /{id}/beacon            -> unassign_beacon
/// POST   /{id}/enroll            -> enroll
/// GET    /{id}/sessions          -> list_sessions
/// POST   /{id}/sessions          -> start_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses).post(courses::create_course))
        .route(
            "/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/{id}/roster", get(courses::get_roster))
        .route(
            "/{id}/beacon",
            post(courses::assign_beacon).delete(courses::unassign_beacon),
        )
        .route("/{id}/enroll", post(courses::enroll))
        .route(
            "/{id}/sessions",
            get(class_sessions::list_sessions).post(class_sessions::start_session),
        )
}
