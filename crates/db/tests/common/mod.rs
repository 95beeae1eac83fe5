//! Shared seed helpers for repository integration tests.
//!
//! Role IDs follow the seed data in the roles migration:
//! 1 = system_admin, 2 = head_lecturer, 3 = lecturer, 4 = student.

#![allow(dead_code)]

use sqlx::PgPool;

use attenda_db::models::course::{Course, CreateCourse};
use attenda_db::models::school::{CreateSchool, School};
use attenda_db::models::user::{CreateUser, User};
use attenda_db::repositories::{CourseRepo, SchoolRepo, UserRepo};

pub const ROLE_SYSTEM_ADMIN: i64 = 1;
pub const ROLE_HEAD_LECTURER: i64 = 2;
pub const ROLE_LECTURER: i64 = 3;
pub const ROLE_STUDENT: i64 = 4;

/// Insert a school with the given code.
pub async fn seed_school(pool: &PgPool, code: &str) -> School {
    let input = CreateSchool {
        name: format!("School {code}"),
        code: code.to_string(),
        address: None,
        contact_email: None,
        contact_phone: None,
        timezone: None,
    };
    SchoolRepo::create(pool, &input)
        .await
        .expect("school creation should succeed")
}

/// Insert an approved user with the given role and optional school.
pub async fn seed_user(pool: &PgPool, email: &str, role_id: i64, school_id: Option<i64>) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: "$argon2id$fake-hash-for-tests".to_string(),
        role_id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        school_id,
        approval_status: "approved".to_string(),
        department: None,
        employee_id: None,
        student_id: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Insert a course taught by `instructor_id` in `school_id`.
pub async fn seed_course(
    pool: &PgPool,
    code: &str,
    instructor_id: i64,
    school_id: i64,
) -> Course {
    let input = CreateCourse {
        code: code.to_string(),
        name: format!("Course {code}"),
        instructor_id,
        school_id,
        max_students: Some(30),
        schedule_days: None,
        schedule_start_time: None,
        schedule_end_time: None,
        room: None,
        approval_required: None,
    };
    CourseRepo::create(pool, &input)
        .await
        .expect("course creation should succeed")
}
