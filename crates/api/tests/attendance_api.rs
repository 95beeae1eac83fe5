//! HTTP-level integration tests for the session lifecycle and attendance
//! check-in flows (QR and BLE), including beacon assignment conflicts.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_school, create_test_user, get_auth, login_token, patch_json_auth,
    post_json_auth, ROLE_HEAD_LECTURER, ROLE_LECTURER, ROLE_STUDENT,
};
use sqlx::PgPool;

/// Seed a school, lecturer, open course, and one enrolled student.
/// Returns (school_id, lecturer_token, course_id, student_token).
async fn seed_classroom(pool: &PgPool) -> (i64, String, i64, String) {
    let school = create_test_school(pool, "ENG").await;
    let lecturer = create_test_user(pool, "lect@eng.test", ROLE_LECTURER, Some(school)).await;
    let lect_token = login_token(common::build_test_app(pool.clone()), "lect@eng.test").await;

    let body = serde_json::json!({
        "code": "ENG101",
        "name": "Statics",
        "instructor_id": lecturer.id,
        "school_id": school,
        "max_students": 30
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/courses", body, &lect_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let course_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    create_test_user(pool, "s@eng.test", ROLE_STUDENT, Some(school)).await;
    let student_token = login_token(common::build_test_app(pool.clone()), "s@eng.test").await;
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/courses/{course_id}/enroll"),
        serde_json::json!({}),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    (school, lect_token, course_id, student_token)
}

/// Start a session and return its id.
async fn start_session(pool: &PgPool, course_id: i64, lect_token: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/courses/{course_id}/sessions"),
        serde_json::json!({}),
        lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// QR flow: enable, read the rotating code, check in, duplicate conflicts.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_qr_check_in_flow(pool: PgPool) {
    let (_school, lect_token, course, student_token) = seed_classroom(&pool).await;
    let session = start_session(&pool, course, &lect_token).await;

    // Check-in before QR is enabled conflicts.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "qr", "code": "000000" }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Lecturer enables QR and reads the current code.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/qr/enable"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/sessions/{session}/qr"), &lect_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let code = json["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);

    // Students may not read the code endpoint.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/sessions/{session}/qr"), &student_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A wrong code is rejected.
    let wrong = if code == "123456" { "654321" } else { "123456" };
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "qr", "code": wrong }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The real code checks in as verified (within the window).
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "qr", "code": code }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "verified");
    assert_eq!(json["data"]["method"], "qr");

    // Checking in twice conflicts on the unique (session, student) pair.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "qr", "code": code }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// BLE flow: beacon must be assigned before enabling; proximity check-ins
/// land pending and verify to a final status.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ble_check_in_flow(pool: PgPool) {
    let (school, lect_token, course, student_token) = seed_classroom(&pool).await;
    let session = start_session(&pool, course, &lect_token).await;

    // Enabling BLE without an assigned beacon conflicts.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/beacon/enable"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // An HOD registers a beacon; the lecturer assigns it to the course.
    create_test_user(&pool, "hod@eng.test", ROLE_HEAD_LECTURER, Some(school)).await;
    let hod_token = login_token(common::build_test_app(pool.clone()), "hod@eng.test").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/beacons",
        serde_json::json!({ "beacon_uid": "uid-room-101", "name": "Room 101", "school_id": school }),
        &hod_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let beacon_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/courses/{course}/beacon"),
        serde_json::json!({ "beacon_id": beacon_id }),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/beacon/enable"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A mismatched beacon UID is rejected.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "ble", "beacon_uid": "uid-other-room" }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The matching UID records a pending check-in.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "ble", "beacon_uid": "uid-room-101" }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    let record_id = json["data"]["id"].as_i64().unwrap();

    // The lecturer verifies the proximity evidence; in-window => verified.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/attendance/{record_id}/verify"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "verified");

    // Verification happens once.
    let app = common::build_test_app(pool);
    let response = patch_json_auth(
        app,
        &format!("/api/v1/attendance/{record_id}/verify"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A beacon is assigned to at most one course: the second claim conflicts.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_beacon_double_assignment_conflicts(pool: PgPool) {
    let (school, lect_token, course_a, _student) = seed_classroom(&pool).await;

    // A second course by the same lecturer.
    let lecturer_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = 'lect@eng.test'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/courses",
        serde_json::json!({
            "code": "ENG102",
            "name": "Dynamics",
            "instructor_id": lecturer_id,
            "school_id": school
        }),
        &lect_token,
    )
    .await;
    let course_b = body_json(response).await["data"]["id"].as_i64().unwrap();

    create_test_user(&pool, "hod@eng.test", ROLE_HEAD_LECTURER, Some(school)).await;
    let hod_token = login_token(common::build_test_app(pool.clone()), "hod@eng.test").await;
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/beacons",
        serde_json::json!({ "beacon_uid": "uid-shared", "name": "Shared", "school_id": school }),
        &hod_token,
    )
    .await;
    let beacon_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/courses/{course_a}/beacon"),
        serde_json::json!({ "beacon_id": beacon_id }),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The same beacon cannot be claimed for the second course.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/courses/{course_b}/beacon"),
        serde_json::json!({ "beacon_id": beacon_id }),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Deleting an assigned beacon is also refused.
    let app = common::build_test_app(pool);
    let response = common::delete_auth(app, &format!("/api/v1/beacons/{beacon_id}"), &hod_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Ending a session finalizes attendance and happens exactly once.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_session_finalizes(pool: PgPool) {
    let (_school, lect_token, course, student_token) = seed_classroom(&pool).await;
    let session = start_session(&pool, course, &lect_token).await;

    // The enrolled student never checks in.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/end"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["data"]["ended_at"].is_null());

    // The attendance sheet shows them absent.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/sessions/{session}/attendance"),
        &lect_token,
    )
    .await;
    let json = body_json(response).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "absent");

    // Ending twice conflicts.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/end"),
        serde_json::json!({}),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Check-ins after the end conflict too.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/check-in"),
        serde_json::json!({ "method": "qr", "code": "000000" }),
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Manual marking upserts over an earlier record.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_manual_mark(pool: PgPool) {
    let (_school, lect_token, course, _student_token) = seed_classroom(&pool).await;
    let session = start_session(&pool, course, &lect_token).await;

    let student_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = 's@eng.test'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/attendance"),
        serde_json::json!({ "student_id": student_id, "status": "late" }),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "late");
    assert_eq!(json["data"]["method"], "manual");

    // Correcting to verified replaces the record rather than duplicating it.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/attendance"),
        serde_json::json!({ "student_id": student_id, "status": "verified" }),
        &lect_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendance_records WHERE session_id = $1",
    )
    .bind(session)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

/// Analytics reflect recorded attendance.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_course_analytics(pool: PgPool) {
    let (_school, lect_token, course, _student_token) = seed_classroom(&pool).await;
    let session = start_session(&pool, course, &lect_token).await;

    let student_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = 's@eng.test'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/v1/sessions/{session}/attendance"),
        serde_json::json!({ "student_id": student_id, "status": "verified" }),
        &lect_token,
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/analytics/courses/{course}"), &lect_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["sessions_held"], 1);
    assert_eq!(json["data"]["enrolled_count"], 1);
    assert_eq!(json["data"]["verified_count"], 1);
    assert_eq!(json["data"]["attendance_rate"], 1.0);
}
