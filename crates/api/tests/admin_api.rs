//! HTTP-level integration tests for admin school and user management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_school, create_test_user, delete_auth, get_auth, login_token,
    post_json_auth, ROLE_STUDENT, ROLE_SYSTEM_ADMIN,
};
use sqlx::PgPool;

async fn admin_token(pool: &PgPool) -> String {
    create_test_user(pool, "admin@test.com", ROLE_SYSTEM_ADMIN, None).await;
    login_token(common::build_test_app(pool.clone()), "admin@test.com").await
}

// ---------------------------------------------------------------------------
// Schools
// ---------------------------------------------------------------------------

/// Admin can create a school; the row lands with defaults applied.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_school(pool: PgPool) {
    let token = admin_token(&pool).await;

    let body = serde_json::json!({
        "name": "Faculty of Engineering",
        "code": "ENG",
        "contact_email": "office@eng.test"
    });
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/admin/schools", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["code"], "ENG");
    assert_eq!(json["data"]["timezone"], "UTC");
    assert_eq!(json["data"]["is_active"], true);
}

/// A duplicate school code conflicts (409).
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_school_code_conflicts(pool: PgPool) {
    let token = admin_token(&pool).await;
    create_test_school(&pool, "ENG").await;

    let body = serde_json::json!({ "name": "Other", "code": "ENG" });
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/admin/schools", body, &token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Deleting a school with users fails with a dependency conflict; deleting
/// one with none succeeds.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_school_delete_dependency_check(pool: PgPool) {
    let token = admin_token(&pool).await;
    let busy = create_test_school(&pool, "BUSY").await;
    let empty = create_test_school(&pool, "EMPTY").await;
    create_test_user(&pool, "member@busy.test", ROLE_STUDENT, Some(busy)).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/schools/{busy}"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/schools/{empty}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/admin/schools/{empty}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// User listing filters
// ---------------------------------------------------------------------------

/// Filtering by role + school + approval status returns only matching users.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_list_filters(pool: PgPool) {
    let token = admin_token(&pool).await;
    let school_a = create_test_school(&pool, "AAA").await;
    let school_b = create_test_school(&pool, "BBB").await;

    create_test_user(&pool, "s1@a.test", ROLE_STUDENT, Some(school_a)).await;
    let pending = create_test_user(&pool, "s2@a.test", ROLE_STUDENT, Some(school_a)).await;
    create_test_user(&pool, "s3@b.test", ROLE_STUDENT, Some(school_b)).await;
    create_test_user(&pool, "lect@a.test", common::ROLE_LECTURER, Some(school_a)).await;

    sqlx::query("UPDATE users SET approval_status = 'pending' WHERE id = $1")
        .bind(pending.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users?role=student&school_id={school_a}&approval_status=approved");
    let response = get_auth(app, &uri, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "s1@a.test");

    // Same filter with pending status finds the other student.
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/admin/users?role=student&school_id={school_a}&approval_status=pending");
    let response = get_auth(app, &uri, &token).await;
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "s2@a.test");
}

/// An unknown approval status filter is a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_list_rejects_bad_status(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users?approval_status=bogus", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Admin-created users are approved immediately and can log in.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_create_user(pool: PgPool) {
    let token = admin_token(&pool).await;
    let school = create_test_school(&pool, "ENG").await;

    let body = serde_json::json!({
        "email": "new@test.com",
        "password": "strong_password_123!",
        "role_id": common::ROLE_LECTURER,
        "first_name": "New",
        "last_name": "Lecturer",
        "school_id": school,
        "department": "Mechanical"
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["role"], "lecturer");
    assert_eq!(json["approval_status"], "approved");
    assert!(json.get("password_hash").is_none(), "hash never leaves the API");

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "new@test.com", "password": "strong_password_123!" });
    let response = common::post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}
