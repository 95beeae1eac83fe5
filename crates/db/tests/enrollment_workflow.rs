//! Integration tests for the enrollment request approval workflow:
//! exactly-once transitions, idempotent approval, and atomic side effects.

mod common;

use assert_matches::assert_matches;
use common::{seed_course, seed_school, seed_user, ROLE_LECTURER, ROLE_STUDENT};
use sqlx::PgPool;

use attenda_db::repositories::{
    ApproveOutcome, EnrollmentRepo, EnrollmentRequestRepo, NotificationRepo,
};

/// Approval transitions the request, creates exactly one enrollment, and
/// notifies the student -- all visible after the call.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_creates_enrollment_and_notification(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let student = seed_user(&pool, "s@eng.test", ROLE_STUDENT, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;

    let request = EnrollmentRequestRepo::create(&pool, course.id, student.id)
        .await
        .unwrap();
    assert_eq!(request.status, "pending");

    let outcome = EnrollmentRequestRepo::approve(&pool, request.id, lecturer.id, None)
        .await
        .unwrap()
        .expect("request exists");

    let enrollment = assert_matches!(outcome, ApproveOutcome::Approved(e) => e);
    assert_eq!(enrollment.course_id, course.id);
    assert_eq!(enrollment.student_id, student.id);

    let updated = EnrollmentRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "approved");
    assert_eq!(updated.reviewed_by, Some(lecturer.id));
    assert!(updated.reviewed_at.is_some());

    let unread = NotificationRepo::unread_count(&pool, student.id)
        .await
        .unwrap();
    assert_eq!(unread, 1, "student receives exactly one notification");
}

/// Approving twice is idempotent: the second call reports AlreadyApproved
/// and the enrollment table still holds exactly one row.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repeat_approval_is_idempotent(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let student = seed_user(&pool, "s@eng.test", ROLE_STUDENT, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;

    let request = EnrollmentRequestRepo::create(&pool, course.id, student.id)
        .await
        .unwrap();

    let first = EnrollmentRequestRepo::approve(&pool, request.id, lecturer.id, None)
        .await
        .unwrap()
        .unwrap();
    let first_enrollment = assert_matches!(first, ApproveOutcome::Approved(e) => e);

    let second = EnrollmentRequestRepo::approve(&pool, request.id, lecturer.id, None)
        .await
        .unwrap()
        .unwrap();
    let second_enrollment = assert_matches!(second, ApproveOutcome::AlreadyApproved(e) => e);
    assert_eq!(first_enrollment.id, second_enrollment.id);

    let count = EnrollmentRepo::count_for_course(&pool, course.id)
        .await
        .unwrap();
    assert_eq!(count, 1, "exactly one enrollment row ever exists");
}

/// A rejected request cannot be approved afterwards.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_after_reject_fails(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let student = seed_user(&pool, "s@eng.test", ROLE_STUDENT, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;

    let request = EnrollmentRequestRepo::create(&pool, course.id, student.id)
        .await
        .unwrap();

    let rejected = EnrollmentRequestRepo::reject(&pool, request.id, lecturer.id, Some("full"))
        .await
        .unwrap()
        .expect("pending request rejects");
    assert_eq!(rejected.status, "rejected");
    assert_eq!(rejected.notes.as_deref(), Some("full"));

    let outcome = EnrollmentRequestRepo::approve(&pool, request.id, lecturer.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_matches!(outcome, ApproveOutcome::AlreadyRejected);

    let count = EnrollmentRepo::count_for_course(&pool, course.id)
        .await
        .unwrap();
    assert_eq!(count, 0, "rejection never enrolls");
}

/// Rejecting an already-reviewed request is a no-op returning None.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_happens_once(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let student = seed_user(&pool, "s@eng.test", ROLE_STUDENT, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;

    let request = EnrollmentRequestRepo::create(&pool, course.id, student.id)
        .await
        .unwrap();

    EnrollmentRequestRepo::reject(&pool, request.id, lecturer.id, None)
        .await
        .unwrap()
        .expect("first reject succeeds");

    let second = EnrollmentRequestRepo::reject(&pool, request.id, lecturer.id, None)
        .await
        .unwrap();
    assert!(second.is_none(), "second reject must not transition again");
}

/// Only one open request per (course, student) may exist at a time.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_single_pending_request(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let student = seed_user(&pool, "s@eng.test", ROLE_STUDENT, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;

    EnrollmentRequestRepo::create(&pool, course.id, student.id)
        .await
        .unwrap();

    let result = EnrollmentRequestRepo::create(&pool, course.id, student.id).await;
    let err = result.expect_err("second open request must fail");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}
