//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_table.sql`.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_LECTURER: &str = "lecturer";
pub const ROLE_HEAD_LECTURER: &str = "head_lecturer";
pub const ROLE_SYSTEM_ADMIN: &str = "system_admin";

/// Roles allowed to teach courses and run class sessions.
pub const TEACHING_ROLES: &[&str] = &[ROLE_LECTURER, ROLE_HEAD_LECTURER, ROLE_SYSTEM_ADMIN];

/// Whether `role` carries lecturer privileges (lecturer and up).
pub fn is_teaching_role(role: &str) -> bool {
    TEACHING_ROLES.contains(&role)
}

/// Whether `role` carries head-of-department privileges (HOD and up).
pub fn is_hod_role(role: &str) -> bool {
    role == ROLE_HEAD_LECTURER || role == ROLE_SYSTEM_ADMIN
}
