//! Route definitions for the `/beacons` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::beacons;
use crate::state::AppState;

/// Routes mounted at `/beacons`.
///
/// ```text
/// GET    /                -> list_beacons
/// POST   /                -> create_beacon
/// GET    /{id}            -> get_beacon
/// PUT    /{id}            -> update_beacon
/// DELETE /{id}            -> delete_beacon
/// POST   /{id}/heartbeat  -> heartbeat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(beacons::list_beacons).post(beacons::create_beacon))
        .route(
            "/{id}",
            get(beacons::get_beacon)
                .put(beacons::update_beacon)
                .delete(beacons::delete_beacon),
        )
        .route("/{id}/heartbeat", post(beacons::heartbeat))
}
