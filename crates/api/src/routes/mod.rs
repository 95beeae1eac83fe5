pub mod admin;
pub mod analytics;
pub mod approvals;
pub mod auth;
pub mod beacons;
pub mod courses;
pub mod health;
pub mod notification;
pub mod profile;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/refresh                         refresh (public)
/// /auth/logout                          logout (requires auth)
///
/// /admin/users                          list, create (system_admin)
/// /admin/users/{id}                     get, update, deactivate
/// /admin/users/{id}/reset-password      reset password
/// /admin/schools                        list, create (system_admin)
/// /admin/schools/{id}                   get, update, delete (409 with dependents)
///
/// /schools/{id}/join                    request membership (any authed user)
///
/// /courses                              list, create
/// /courses/{id}                         get, update, delete (409 with dependents)
/// /courses/{id}/roster                  enrolled students
/// /courses/{id}/beacon                  assign (atomic claim), unassign
/// /courses/{id}/enroll                  student self-enrollment
/// /courses/{course_id}/sessions         list, start
///
/// /sessions/{id}                        get
/// /sessions/{id}/end                    end + finalize attendance (one-shot)
/// /sessions/{id}/qr                     current rotating code (owner)
/// /sessions/{id}/qr/enable|disable      toggle QR check-in
/// /sessions/{id}/beacon/enable|disable  toggle BLE check-in
/// /sessions/{id}/check-in               student check-in (QR or BLE)
/// /sessions/{id}/attendance             list records, manual mark
///
/// /attendance/{id}/verify               promote a pending BLE record
///
/// /beacons                              list, register (HOD and up)
/// /beacons/{id}                         get, update, delete
/// /beacons/{id}/heartbeat               battery/signal report
///
/// /enrollment-requests                  review queue (?status)
/// /enrollment-requests/{id}/approve     approve (idempotent)
/// /enrollment-requests/{id}/reject      reject
///
/// /membership-requests                  review queue (?status)
/// /membership-requests/{id}/approve     approve (stamps user)
/// /membership-requests/{id}/reject      reject
///
/// /notifications                        list (?unread_only, limit, offset)
/// /notifications/unread-count           unread count
/// /notifications/read-all               mark all read
/// /notifications/{id}/read              mark read
///
/// /analytics/courses/{id}               course summary
/// /analytics/sessions/{id}              session summary
/// /analytics/schools/{id}               school overview
///
/// /me                                   get, update own profile
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // Admin routes (user + school management).
        .nest("/admin", admin::router())
        // Membership self-service.
        .nest("/schools", approvals::school_join_router())
        // Courses and course-scoped sub-resources (sessions, roster, beacon).
        .nest("/courses", courses::router())
        // Session-scoped actions (lifecycle, check-in, attendance sheet).
        .nest("/sessions", sessions::router())
        // Attendance-record-scoped actions.
        .nest("/attendance", sessions::attendance_router())
        // Beacon fleet management.
        .nest("/beacons", beacons::router())
        // Review workflows.
        .nest("/enrollment-requests", approvals::enrollment_router())
        .nest("/membership-requests", approvals::membership_router())
        // Notifications.
        .nest("/notifications", notification::router())
        // Analytics aggregates.
        .nest("/analytics", analytics::router())
        // Own profile.
        .nest("/me", profile::router())
}
