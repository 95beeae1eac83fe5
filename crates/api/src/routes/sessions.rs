//! Route definitions for the `/sessions` resource (session-scoped actions).

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{attendance, class_sessions};
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /{id}                 -> get_session
/// POST   /{id}/end             -> end_session
/// GET    /{id}/qr              -> current_qr_code
/// POST   /{id}/qr/enable       -> enable_qr
/// POST   /{id}/qr/disable      -> disable_qr
/// POST   /{id}/beacon/enable   -> enable_beacon
/// POST   /{id}/beacon/disable  -> disable_beacon
/// POST   /{id}/check-in        -> check_in (students)
/// GET    /{id}/attendance      -> list_for_session
/// POST   /{id}/attendance      -> manual_mark
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(class_sessions::get_session))
        .route("/{id}/end", post(class_sessions::end_session))
        .route("/{id}/qr", get(class_sessions::current_qr_code))
        .route("/{id}/qr/enable", post(class_sessions::enable_qr))
        .route("/{id}/qr/disable", post(class_sessions::disable_qr))
        .route("/{id}/beacon/enable", post(class_sessions::enable_beacon))
        .route("/{id}/beacon/disable", post(class_sessions::disable_beacon))
        .route("/{id}/check-in", post(attendance::check_in))
        .route(
            "/{id}/attendance",
            get(attendance::list_for_session).post(attendance::manual_mark),
        )
}

/// Routes mounted at `/attendance` (record-scoped actions).
///
/// ```text
/// PATCH  /{id}/verify  -> verify_record
/// ```
pub fn attendance_router() -> Router<AppState> {
    Router::new().route("/{id}/verify", patch(attendance::verify_record))
}
