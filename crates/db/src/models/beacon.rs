//! BLE beacon entity model and DTOs.

use attenda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A beacon row from the `ble_beacons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BleBeacon {
    pub id: DbId,
    pub beacon_uid: String,
    pub mac_address: Option<String>,
    pub name: String,
    pub school_id: DbId,
    pub battery_level: i32,
    /// Last reported RSSI in dBm (negative; closer to zero is stronger).
    pub signal_strength: Option<i32>,
    pub status: String,
    pub assigned_course_id: Option<DbId>,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new beacon.
#[derive(Debug, Deserialize)]
pub struct CreateBeacon {
    pub beacon_uid: String,
    pub mac_address: Option<String>,
    pub name: String,
    pub school_id: DbId,
}

/// DTO for updating a beacon. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBeacon {
    pub mac_address: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

/// Battery/signal report from the device bridge.
#[derive(Debug, Deserialize)]
pub struct BeaconHeartbeat {
    pub battery_level: i32,
    pub signal_strength: Option<i32>,
}

/// Filter for beacon listings.
#[derive(Debug, Default)]
pub struct BeaconFilter {
    pub school_id: Option<DbId>,
    pub status: Option<String>,
}
