//! Repository for the `ble_beacons` table.
//!
//! Beacon-to-course assignment is an atomic conditional claim against the
//! `assigned_course_id` column, backed by a partial unique index. There is
//! deliberately no read-check-then-write path.

use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::beacon::{BeaconFilter, BeaconHeartbeat, BleBeacon, CreateBeacon, UpdateBeacon};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, beacon_uid, mac_address, name, school_id, battery_level, \
                       signal_strength, status, assigned_course_id, last_seen_at, \
                       created_at, updated_at";

/// Provides CRUD and assignment operations for BLE beacons.
pub struct BeaconRepo;

impl BeaconRepo {
    /// Register a new beacon, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBeacon) -> Result<BleBeacon, sqlx::Error> {
        let query = format!(
            "INSERT INTO ble_beacons (beacon_uid, mac_address, name, school_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(&input.beacon_uid)
            .bind(&input.mac_address)
            .bind(&input.name)
            .bind(input.school_id)
            .fetch_one(pool)
            .await
    }

    /// Find a beacon by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BleBeacon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ble_beacons WHERE id = $1");
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the beacon currently assigned to a course.
    pub async fn find_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<BleBeacon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ble_beacons WHERE assigned_course_id = $1");
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// List beacons matching the filter, ordered by name.
    pub async fn list(
        pool: &PgPool,
        filter: &BeaconFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BleBeacon>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ble_beacons
             WHERE ($1::bigint IS NULL OR school_id = $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY name ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(filter.school_id)
            .bind(&filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a beacon's metadata. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBeacon,
    ) -> Result<Option<BleBeacon>, sqlx::Error> {
        let query = format!(
            "UPDATE ble_beacons SET
                mac_address = COALESCE($2, mac_address),
                name = COALESCE($3, name),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(id)
            .bind(&input.mac_address)
            .bind(&input.name)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Record a battery/signal report from the device bridge.
    pub async fn heartbeat(
        pool: &PgPool,
        id: DbId,
        input: &BeaconHeartbeat,
    ) -> Result<Option<BleBeacon>, sqlx::Error> {
        let query = format!(
            "UPDATE ble_beacons SET
                battery_level = $2,
                signal_strength = $3,
                last_seen_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(id)
            .bind(input.battery_level)
            .bind(input.signal_strength)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim a beacon for a course.
    ///
    /// Succeeds only when the beacon is currently unassigned; concurrent
    /// claims race on the row update (and the partial unique index), so at
    /// most one wins. Returns the updated row, or `None` when the beacon was
    /// already assigned or does not exist.
    pub async fn assign_to_course(
        pool: &PgPool,
        beacon_id: DbId,
        course_id: DbId,
    ) -> Result<Option<BleBeacon>, sqlx::Error> {
        let query = format!(
            "UPDATE ble_beacons SET assigned_course_id = $2
             WHERE id = $1 AND assigned_course_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BleBeacon>(&query)
            .bind(beacon_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Release whatever beacon is assigned to a course.
    ///
    /// Returns `true` if an assignment was cleared.
    pub async fn unassign_course(pool: &PgPool, course_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ble_beacons SET assigned_course_id = NULL WHERE assigned_course_id = $1",
        )
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a beacon. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ble_beacons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
