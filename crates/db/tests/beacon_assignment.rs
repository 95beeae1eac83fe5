//! Integration tests for beacon registration and the atomic course claim.

mod common;

use common::{seed_course, seed_school, seed_user, ROLE_LECTURER};
use sqlx::PgPool;

use attenda_db::models::beacon::{BeaconHeartbeat, CreateBeacon};
use attenda_db::repositories::BeaconRepo;

async fn seed_beacon(pool: &PgPool, uid: &str, school_id: i64) -> attenda_db::models::beacon::BleBeacon {
    let input = CreateBeacon {
        beacon_uid: uid.to_string(),
        mac_address: Some("AA:BB:CC:DD:EE:FF".to_string()),
        name: format!("Beacon {uid}"),
        school_id,
    };
    BeaconRepo::create(pool, &input)
        .await
        .expect("beacon creation should succeed")
}

/// A fresh beacon starts active, full battery, unassigned.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_beacon_defaults(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let beacon = seed_beacon(&pool, "uid-001", school.id).await;

    assert_eq!(beacon.status, "active");
    assert_eq!(beacon.battery_level, 100);
    assert!(beacon.assigned_course_id.is_none());
}

/// The claim succeeds once; a second claim on the same beacon returns None.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_is_single_winner(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let course_a = seed_course(&pool, "ENG101", lecturer.id, school.id).await;
    let course_b = seed_course(&pool, "ENG102", lecturer.id, school.id).await;
    let beacon = seed_beacon(&pool, "uid-002", school.id).await;

    let first = BeaconRepo::assign_to_course(&pool, beacon.id, course_a.id)
        .await
        .unwrap();
    assert_eq!(
        first.expect("first claim wins").assigned_course_id,
        Some(course_a.id)
    );

    // The beacon is taken; a claim for another course must lose.
    let second = BeaconRepo::assign_to_course(&pool, beacon.id, course_b.id)
        .await
        .unwrap();
    assert!(second.is_none(), "claim on an assigned beacon must fail");
}

/// A course holds at most one beacon: the partial unique index rejects a
/// second beacon claiming the same course.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_course_holds_one_beacon(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let course = seed_course(&pool, "ENG101", lecturer.id, school.id).await;
    let beacon_a = seed_beacon(&pool, "uid-00a", school.id).await;
    let beacon_b = seed_beacon(&pool, "uid-00b", school.id).await;

    BeaconRepo::assign_to_course(&pool, beacon_a.id, course.id)
        .await
        .unwrap()
        .expect("first beacon claims the course");

    let result = BeaconRepo::assign_to_course(&pool, beacon_b.id, course.id).await;
    let err = result.expect_err("second beacon on the same course must fail");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

/// Unassigning frees the beacon for a new claim.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unassign_then_reclaim(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let lecturer = seed_user(&pool, "l@eng.test", ROLE_LECTURER, Some(school.id)).await;
    let course_a = seed_course(&pool, "ENG101", lecturer.id, school.id).await;
    let course_b = seed_course(&pool, "ENG102", lecturer.id, school.id).await;
    let beacon = seed_beacon(&pool, "uid-003", school.id).await;

    BeaconRepo::assign_to_course(&pool, beacon.id, course_a.id)
        .await
        .unwrap()
        .expect("claim succeeds");

    assert!(BeaconRepo::unassign_course(&pool, course_a.id).await.unwrap());
    assert!(
        BeaconRepo::find_for_course(&pool, course_a.id)
            .await
            .unwrap()
            .is_none(),
        "course has no beacon after unassign"
    );

    let reclaimed = BeaconRepo::assign_to_course(&pool, beacon.id, course_b.id)
        .await
        .unwrap();
    assert!(reclaimed.is_some(), "freed beacon is claimable again");
}

/// Heartbeats update battery, signal, and last_seen_at.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_heartbeat_updates_health(pool: PgPool) {
    let school = seed_school(&pool, "ENG").await;
    let beacon = seed_beacon(&pool, "uid-004", school.id).await;

    let report = BeaconHeartbeat {
        battery_level: 37,
        signal_strength: Some(-68),
    };
    let updated = BeaconRepo::heartbeat(&pool, beacon.id, &report)
        .await
        .unwrap()
        .expect("beacon should exist");

    assert_eq!(updated.battery_level, 37);
    assert_eq!(updated.signal_strength, Some(-68));
    assert!(updated.last_seen_at.is_some());
}
