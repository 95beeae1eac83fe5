//! Aggregate queries backing the analytics endpoints.
//!
//! Everything here is read-only SQL; rates are computed in the query so the
//! API layer stays a pass-through.

use attenda_core::beacon::LOW_BATTERY_PERCENT;
use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::analytics::{CourseAnalytics, SchoolAnalytics, SessionAnalytics};

/// Provides read-only aggregate queries.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Attendance aggregates for one course.
    ///
    /// `attendance_rate` counts verified + late records against the expected
    /// total (sessions held x enrolled students), 0.0 when either is zero.
    pub async fn course_summary(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<CourseAnalytics, sqlx::Error> {
        sqlx::query_as::<_, CourseAnalytics>(
            "WITH expected AS (
                 SELECT (SELECT COUNT(*) FROM class_sessions WHERE course_id = $1) AS sessions_held,
                        (SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1) AS enrolled_count
             ),
             records AS (
                 SELECT COUNT(*) FILTER (WHERE r.status = 'verified') AS verified_count,
                        COUNT(*) FILTER (WHERE r.status = 'pending')  AS pending_count,
                        COUNT(*) FILTER (WHERE r.status = 'late')     AS late_count,
                        COUNT(*) FILTER (WHERE r.status = 'absent')   AS absent_count
                 FROM attendance_records r
                 JOIN class_sessions s ON s.id = r.session_id
                 WHERE s.course_id = $1
             )
             SELECT $1 AS course_id,
                    e.sessions_held, e.enrolled_count,
                    r.verified_count, r.pending_count, r.late_count, r.absent_count,
                    CASE WHEN e.sessions_held * e.enrolled_count = 0 THEN 0.0
                         ELSE (r.verified_count + r.late_count)::float8
                              / (e.sessions_held * e.enrolled_count)
                    END AS attendance_rate
             FROM expected e, records r",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Per-status and per-method counts for one session.
    pub async fn session_summary(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<SessionAnalytics, sqlx::Error> {
        sqlx::query_as::<_, SessionAnalytics>(
            "SELECT $1 AS session_id,
                    (SELECT COUNT(*) FROM course_enrollments e
                     JOIN class_sessions s ON s.course_id = e.course_id
                     WHERE s.id = $1) AS enrolled_count,
                    COUNT(*) FILTER (WHERE status = 'verified') AS verified_count,
                    COUNT(*) FILTER (WHERE status = 'pending')  AS pending_count,
                    COUNT(*) FILTER (WHERE status = 'late')     AS late_count,
                    COUNT(*) FILTER (WHERE status = 'absent')   AS absent_count,
                    COUNT(*) FILTER (WHERE method = 'ble')      AS ble_count,
                    COUNT(*) FILTER (WHERE method = 'qr')       AS qr_count,
                    COUNT(*) FILTER (WHERE method = 'manual')   AS manual_count
             FROM attendance_records
             WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(pool)
        .await
    }

    /// School-wide overview counts and attendance rate.
    pub async fn school_overview(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<SchoolAnalytics, sqlx::Error> {
        sqlx::query_as::<_, SchoolAnalytics>(
            "WITH school_records AS (
                 SELECT r.status
                 FROM attendance_records r
                 JOIN class_sessions s ON s.id = r.session_id
                 JOIN courses c ON c.id = s.course_id
                 WHERE c.school_id = $1
             )
             SELECT $1 AS school_id,
                    (SELECT COUNT(*) FROM courses WHERE school_id = $1) AS course_count,
                    (SELECT COUNT(*) FROM users u JOIN roles ro ON ro.id = u.role_id
                     WHERE u.school_id = $1 AND ro.name = 'student') AS student_count,
                    (SELECT COUNT(*) FROM users u JOIN roles ro ON ro.id = u.role_id
                     WHERE u.school_id = $1
                       AND ro.name IN ('lecturer', 'head_lecturer')) AS lecturer_count,
                    (SELECT COUNT(*) FROM ble_beacons WHERE school_id = $1) AS beacon_count,
                    (SELECT COUNT(*) FROM ble_beacons
                     WHERE school_id = $1 AND battery_level <= $2) AS low_battery_beacon_count,
                    (SELECT COUNT(*) FROM class_sessions s
                     JOIN courses c ON c.id = s.course_id
                     WHERE c.school_id = $1) AS sessions_held,
                    CASE WHEN (SELECT COUNT(*) FROM school_records) = 0 THEN 0.0
                         ELSE (SELECT COUNT(*) FROM school_records
                               WHERE status IN ('verified', 'late'))::float8
                              / (SELECT COUNT(*) FROM school_records)
                    END AS attendance_rate",
        )
        .bind(school_id)
        .bind(LOW_BATTERY_PERCENT)
        .fetch_one(pool)
        .await
    }
}
