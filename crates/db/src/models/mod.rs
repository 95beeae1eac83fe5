//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches
//!
//! Rows carrying server-only columns (`password_hash`, `qr_secret`) are not
//! `Serialize`; use the accompanying `*Response` struct for API output.

pub mod analytics;
pub mod attendance;
pub mod beacon;
pub mod class_session;
pub mod course;
pub mod enrollment;
pub mod enrollment_request;
pub mod membership_request;
pub mod notification;
pub mod role;
pub mod school;
pub mod session;
pub mod user;
