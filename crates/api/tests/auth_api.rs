//! HTTP-level integration tests for auth endpoints: registration, login,
//! token refresh, logout, lockout, and RBAC enforcement.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_school, create_test_user, get, get_auth, login_token, post_json,
    post_json_auth, ROLE_LECTURER, ROLE_STUDENT, ROLE_SYSTEM_ADMIN, TEST_PASSWORD,
};
use sqlx::PgPool;

use attenda_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration creates a pending account and files a membership request
/// when a school is named.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_pending_user(pool: PgPool) {
    let school_id = create_test_school(&pool, "ENG").await;
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({
        "email": "fresh@test.com",
        "password": "a_long_enough_password",
        "role": "student",
        "first_name": "Fresh",
        "last_name": "Student",
        "school_id": school_id,
        "student_id": "S-1001"
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["approval_status"], "pending");
    assert_eq!(json["data"]["role"], "student");
    // The school link is granted on approval, not at registration.
    assert!(json["data"]["school_id"].is_null());

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM school_membership_requests WHERE school_id = $1 AND status = 'pending'",
    )
    .bind(school_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 1, "registration files one membership request");
}

/// Privileged roles cannot self-register.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_privileged_roles(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "sneaky@test.com",
        "password": "a_long_enough_password",
        "role": "system_admin",
        "first_name": "Sneaky",
        "last_name": "User"
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A malformed email fails validation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "a_long_enough_password",
        "role": "student",
        "first_name": "Bad",
        "last_name": "Email"
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns tokens and user info.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_test_user(&pool, "login@test.com", ROLE_LECTURER, None).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "login@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "lecturer");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_test_user(&pool, "wrongpw@test.com", ROLE_STUDENT, None).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "wrongpw@test.com", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login to a deactivated account returns 403.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let user = create_test_user(&pool, "inactive@test.com", ROLE_STUDENT, None).await;
    UserRepo::deactivate(&pool, user.id)
        .await
        .expect("deactivation should succeed");
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "inactive@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A rejected registration cannot sign in; a pending one still can.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_approval_status_gate(pool: PgPool) {
    let user = create_test_user(&pool, "gate@test.com", ROLE_STUDENT, None).await;
    sqlx::query("UPDATE users SET approval_status = 'pending' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "gate@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "pending accounts may log in");

    sqlx::query("UPDATE users SET approval_status = 'rejected' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "gate@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "rejected accounts may not");
}

/// Account lockout: after 5 failed attempts the account is locked.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    create_test_user(&pool, "lockme@test.com", ROLE_STUDENT, None).await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({ "email": "lockme@test.com", "password": "wrong_pass" });
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The 6th attempt (even with the wrong password) should return 403 (locked).
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "lockme@test.com", "password": "wrong_pass" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    let error_msg = json["error"].as_str().unwrap_or("");
    assert!(
        error_msg.contains("locked"),
        "error message should mention the account is locked, got: {error_msg}"
    );
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new, rotated tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    create_test_user(&pool, "refresher@test.com", ROLE_STUDENT, None).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "refresher@test.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    let login_json = body_json(response).await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(
        json["refresh_token"].as_str().unwrap(),
        refresh_token,
        "refresh token must rotate on use"
    );

    // The old token was revoked by the rotation.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes sessions and returns 204 No Content.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout(pool: PgPool) {
    create_test_user(&pool, "logout@test.com", ROLE_STUDENT, None).await;

    let app = common::build_test_app(pool.clone());
    let token = login_token(app, "logout@test.com").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), &token).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// RBAC enforcement
// ---------------------------------------------------------------------------

/// Admin endpoints require authentication -- missing token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_endpoint_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/admin/users").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A lecturer is forbidden from system-admin endpoints.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_endpoint_requires_admin_role(pool: PgPool) {
    create_test_user(&pool, "lect@test.com", ROLE_LECTURER, None).await;

    let app = common::build_test_app(pool.clone());
    let token = login_token(app, "lect@test.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A system admin can reach admin endpoints.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_endpoint_allows_admin(pool: PgPool) {
    create_test_user(&pool, "admin@test.com", ROLE_SYSTEM_ADMIN, None).await;

    let app = common::build_test_app(pool.clone());
    let token = login_token(app, "admin@test.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
}
