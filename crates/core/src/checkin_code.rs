//! Rotating QR check-in codes.
//!
//! Each class session holds a random hex secret. The displayed code is a
//! 6-digit HMAC-SHA256 truncation (RFC 4226 style) of the current rotation
//! window, so a screenshotted code goes stale within [`ROTATION_SECS`].
//! Validation accepts the current and immediately previous window to absorb
//! clock skew and in-flight requests.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Number of digits in a displayed check-in code.
pub const CODE_DIGITS: u32 = 6;

/// Seconds before the displayed code rotates.
pub const ROTATION_SECS: i64 = 30;

/// Byte length of a session secret (hex-encoded to twice this).
pub const SECRET_BYTES: usize = 20;

/// Generate a fresh random session secret, hex-encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The rotation window index containing `now`.
pub fn window(now: Timestamp) -> i64 {
    now.timestamp().div_euclid(ROTATION_SECS)
}

/// Derive the code for a specific rotation window.
pub fn code_for_window(secret: &str, window: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(&window.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation per RFC 4226.
    let offset = (digest[31] & 0x0f) as usize;
    let slice = &digest[offset..offset + 4];
    let val = u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]) & 0x7fff_ffff;

    let num = val % 10u32.pow(CODE_DIGITS);
    format!("{num:0width$}", width = CODE_DIGITS as usize)
}

/// The code currently displayed for a session secret.
pub fn current_code(secret: &str, now: Timestamp) -> String {
    code_for_window(secret, window(now))
}

/// Check a submitted code against the current and previous rotation windows.
pub fn verify_code(secret: &str, submitted: &str, now: Timestamp) -> bool {
    let w = window(now);
    submitted == code_for_window(secret, w) || submitted == code_for_window(secret, w - 1)
}
