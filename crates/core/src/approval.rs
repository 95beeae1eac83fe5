//! Approval status constants and validation helpers.
//!
//! The same three-state workflow applies to user accounts, course enrollment
//! requests, and school membership requests: a record starts `pending` and
//! transitions to `approved` or `rejected` exactly once.

/// The request has not yet been reviewed.
pub const STATUS_PENDING: &str = "pending";

/// The request was approved by a reviewer.
pub const STATUS_APPROVED: &str = "approved";

/// The request was rejected by a reviewer.
pub const STATUS_REJECTED: &str = "rejected";

/// All valid approval status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Validate that a status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid approval status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_statuses_accepted() {
        for s in VALID_STATUSES {
            assert!(validate_status(s).is_ok());
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        let err = validate_status("maybe").unwrap_err();
        assert!(err.contains("maybe"));
        assert!(err.contains("pending"));
    }
}
