//! Domain types, error taxonomy, and pure attendance logic.
//!
//! This crate has no I/O: everything here is usable from the DB and API
//! layers as well as any future CLI or worker tooling.

pub mod approval;
pub mod attendance;
pub mod beacon;
pub mod checkin_code;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod types;
