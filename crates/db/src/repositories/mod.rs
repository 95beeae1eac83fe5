//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-step writes that must
//! hold together (request approval, session finalization) run inside a
//! transaction within a single repository method.

pub mod analytics_repo;
pub mod attendance_repo;
pub mod beacon_repo;
pub mod class_session_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod enrollment_request_repo;
pub mod membership_request_repo;
pub mod notification_repo;
pub mod role_repo;
pub mod school_repo;
pub mod session_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use attendance_repo::AttendanceRepo;
pub use beacon_repo::BeaconRepo;
pub use class_session_repo::ClassSessionRepo;
pub use course_repo::CourseRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use enrollment_request_repo::{ApproveOutcome, EnrollmentRequestRepo};
pub use membership_request_repo::MembershipRequestRepo;
pub use notification_repo::NotificationRepo;
pub use role_repo::RoleRepo;
pub use school_repo::SchoolRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
