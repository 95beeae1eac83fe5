//! BLE beacon status constants and health thresholds.
//!
//! Beacons are modeled as database rows; the hardware itself reports in via
//! the heartbeat endpoint. These constants must match the CHECK constraint in
//! `20260301000006_create_ble_beacons_table.sql`.

/// Beacon is deployed and usable for attendance check-in.
pub const STATUS_ACTIVE: &str = "active";

/// Beacon is registered but not currently in use.
pub const STATUS_INACTIVE: &str = "inactive";

/// Beacon is pulled for battery replacement or repair.
pub const STATUS_MAINTENANCE: &str = "maintenance";

/// Beacon has stopped reporting and cannot be located.
pub const STATUS_LOST: &str = "lost";

/// All valid beacon status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_ACTIVE,
    STATUS_INACTIVE,
    STATUS_MAINTENANCE,
    STATUS_LOST,
];

/// Battery percentage at or below which a beacon counts as low-battery
/// in school analytics.
pub const LOW_BATTERY_PERCENT: i32 = 20;

/// Validate that a beacon status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid beacon status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}
