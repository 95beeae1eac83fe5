//! HTTP handlers, one module per resource.

pub mod access;
pub mod admin_users;
pub mod analytics;
pub mod attendance;
pub mod auth;
pub mod beacons;
pub mod class_sessions;
pub mod courses;
pub mod enrollment_requests;
pub mod membership_requests;
pub mod notification;
pub mod profile;
pub mod schools;
