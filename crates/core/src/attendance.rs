//! Attendance method/status constants and check-in classification.
//!
//! A check-in is classified against the session's attendance window: arrivals
//! inside the window are `verified`, arrivals after it (but before the
//! session ends) are `late`. BLE check-ins are recorded `pending` until a
//! lecturer confirms them; students with no record when the session ends are
//! marked `absent` during finalization.

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Check-in methods
// ---------------------------------------------------------------------------

/// Check-in evidenced by proximity to the course's assigned BLE beacon.
pub const METHOD_BLE: &str = "ble";

/// Check-in evidenced by a rotating QR code.
pub const METHOD_QR: &str = "qr";

/// Record entered by the lecturer.
pub const METHOD_MANUAL: &str = "manual";

/// All valid check-in methods.
pub const VALID_METHODS: &[&str] = &[METHOD_BLE, METHOD_QR, METHOD_MANUAL];

// ---------------------------------------------------------------------------
// Record statuses
// ---------------------------------------------------------------------------

/// Presence confirmed (in-window check-in or lecturer verification).
pub const STATUS_VERIFIED: &str = "verified";

/// Proximity reported but not yet confirmed by the lecturer.
pub const STATUS_PENDING: &str = "pending";

/// Checked in after the attendance window closed.
pub const STATUS_LATE: &str = "late";

/// No record existed when the session ended.
pub const STATUS_ABSENT: &str = "absent";

/// All valid attendance record statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_VERIFIED, STATUS_PENDING, STATUS_LATE, STATUS_ABSENT];

/// Default attendance window when a session does not specify one.
pub const DEFAULT_WINDOW_MINS: i32 = 15;

/// Validate that a method string is one of the accepted values.
pub fn validate_method(method: &str) -> Result<(), String> {
    if VALID_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(format!(
            "Invalid check-in method '{method}'. Must be one of: {}",
            VALID_METHODS.join(", ")
        ))
    }
}

/// Validate that a status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid attendance status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Classify a check-in time against the session start and attendance window.
///
/// Returns [`STATUS_VERIFIED`] when `checked_in_at` falls at or before
/// `started_at + window_mins`, [`STATUS_LATE`] otherwise. Early arrivals
/// (before the session start) count as verified.
pub fn classify_checkin(
    started_at: Timestamp,
    window_mins: i32,
    checked_in_at: Timestamp,
) -> &'static str {
    let window_close = started_at + chrono::Duration::minutes(i64::from(window_mins.max(0)));
    if checked_in_at <= window_close {
        STATUS_VERIFIED
    } else {
        STATUS_LATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_checkin_inside_window_is_verified() {
        let at = start() + Duration::minutes(10);
        assert_eq!(classify_checkin(start(), 15, at), STATUS_VERIFIED);
    }

    #[test]
    fn test_checkin_at_window_boundary_is_verified() {
        let at = start() + Duration::minutes(15);
        assert_eq!(classify_checkin(start(), 15, at), STATUS_VERIFIED);
    }

    #[test]
    fn test_checkin_after_window_is_late() {
        let at = start() + Duration::minutes(16);
        assert_eq!(classify_checkin(start(), 15, at), STATUS_LATE);
    }

    #[test]
    fn test_early_checkin_is_verified() {
        let at = start() - Duration::minutes(5);
        assert_eq!(classify_checkin(start(), 15, at), STATUS_VERIFIED);
    }

    #[test]
    fn test_negative_window_treated_as_zero() {
        let at = start() + Duration::seconds(1);
        assert_eq!(classify_checkin(start(), -5, at), STATUS_LATE);
    }

    #[test]
    fn test_method_validation() {
        assert!(validate_method("qr").is_ok());
        assert!(validate_method("carrier-pigeon").is_err());
    }
}
