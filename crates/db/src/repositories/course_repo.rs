//! Repository for the `courses` table.

use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseFilter, CourseWithBeacon, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, instructor_id, school_id, max_students, schedule_days, \
                       schedule_start_time, schedule_end_time, room, approval_required, \
                       is_active, created_at, updated_at";

/// Column list for the beacon/enrollment join, qualified with the `c` alias.
const JOINED_COLUMNS: &str = "c.id, c.code, c.name, c.instructor_id, c.school_id, \
                              c.max_students, c.schedule_days, c.schedule_start_time, \
                              c.schedule_end_time, c.room, c.approval_required, c.is_active, \
                              b.id AS beacon_id, \
                              (SELECT COUNT(*) FROM course_enrollments e \
                                WHERE e.course_id = c.id) AS enrolled_count, \
                              c.created_at, c.updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (code, name, instructor_id, school_id, max_students,
                                  schedule_days, schedule_start_time, schedule_end_time,
                                  room, approval_required)
             VALUES ($1, $2, $3, $4, COALESCE($5, 50), $6, $7, $8, $9, COALESCE($10, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.instructor_id)
            .bind(input.school_id)
            .bind(input.max_students)
            .bind(&input.schedule_days)
            .bind(input.schedule_start_time)
            .bind(input.schedule_end_time)
            .bind(&input.room)
            .bind(input.approval_required)
            .fetch_one(pool)
            .await
    }

    /// Find a course by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course with its assigned beacon and enrollment count.
    pub async fn find_with_beacon(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CourseWithBeacon>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM courses c
             LEFT JOIN ble_beacons b ON b.assigned_course_id = c.id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CourseWithBeacon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List courses matching the filter, with beacon and enrollment count,
    /// ordered by code.
    pub async fn list(
        pool: &PgPool,
        filter: &CourseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseWithBeacon>, sqlx::Error> {
        let active_filter = if filter.include_inactive {
            ""
        } else {
            "AND c.is_active = true"
        };
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM courses c
             LEFT JOIN ble_beacons b ON b.assigned_course_id = c.id
             WHERE ($1::bigint IS NULL OR c.school_id = $1)
               AND ($2::bigint IS NULL OR c.instructor_id = $2)
               {active_filter}
             ORDER BY c.code ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CourseWithBeacon>(&query)
            .bind(filter.school_id)
            .bind(filter.instructor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                instructor_id = COALESCE($4, instructor_id),
                max_students = COALESCE($5, max_students),
                schedule_days = COALESCE($6, schedule_days),
                schedule_start_time = COALESCE($7, schedule_start_time),
                schedule_end_time = COALESCE($8, schedule_end_time),
                room = COALESCE($9, room),
                approval_required = COALESCE($10, approval_required),
                is_active = COALESCE($11, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.instructor_id)
            .bind(input.max_students)
            .bind(&input.schedule_days)
            .bind(input.schedule_start_time)
            .bind(input.schedule_end_time)
            .bind(&input.room)
            .bind(input.approval_required)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Count rows in other tables that still reference this course.
    ///
    /// Deletion is refused while this is non-zero. Pending enrollment
    /// requests do not block deletion (they cascade).
    pub async fn dependent_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM class_sessions WHERE course_id = $1)
                  + (SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Hard-delete a course. Returns `true` if a row was removed.
    ///
    /// Callers must check [`Self::dependent_count`] first; the RESTRICT
    /// foreign keys are the backstop.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
