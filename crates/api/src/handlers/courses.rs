//! Handlers for the `/courses` resource: CRUD, roster, beacon assignment,
//! and student enrollment.

use attenda_core::error::CoreError;
use attenda_core::roles::{is_teaching_role, ROLE_SYSTEM_ADMIN};
use attenda_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;

use attenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use attenda_db::models::course::{
    Course, CourseFilter, CourseWithBeacon, CreateCourse, UpdateCourse,
};
use attenda_db::models::enrollment::RosterEntry;
use attenda_db::repositories::{BeaconRepo, CourseRepo, EnrollmentRepo, EnrollmentRequestRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_approved, ensure_course_manage, load_caller};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireLecturer};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Query parameters for the course listing.
#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    pub school_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /courses/{id}/beacon`.
#[derive(Debug, Deserialize)]
pub struct AssignBeaconRequest {
    pub beacon_id: DbId,
}

/// Result of `POST /courses/{id}/enroll`: either an immediate enrollment or
/// a pending request, depending on the course's `approval_required` flag.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnrollOutcome {
    Enrolled {
        enrollment: attenda_db::models::enrollment::CourseEnrollment,
    },
    Requested {
        request: attenda_db::models::enrollment_request::EnrollmentRequest,
    },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/courses
///
/// Create a course. Lecturers may only create courses they themselves teach;
/// HODs and system admins may set any instructor.
pub async fn create_course(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    if auth.role != ROLE_SYSTEM_ADMIN {
        let caller = load_caller(&state.pool, &auth).await?;
        ensure_approved(&caller)?;

        if !attenda_core::roles::is_hod_role(&auth.role) && input.instructor_id != auth.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Lecturers may only create their own courses".into(),
            )));
        }
        if caller.school_id != Some(input.school_id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Cannot create a course in another school".into(),
            )));
        }
    }

    let course = CourseRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        course_id = course.id,
        code = %course.code,
        "Course created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses?school_id=&instructor_id=&include_inactive=
pub async fn list_courses(
    State(state): State<AppState>,
    RequireAuth(_auth): RequireAuth,
    Query(params): Query<CourseListParams>,
) -> AppResult<Json<DataResponse<Vec<CourseWithBeacon>>>> {
    let filter = CourseFilter {
        school_id: params.school_id,
        instructor_id: params.instructor_id,
        include_inactive: params.include_inactive,
    };
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let courses = CourseRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    RequireAuth(_auth): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseWithBeacon>>> {
    let course = CourseRepo::find_with_beacon(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: course }))
}

/// PUT /api/v1/courses/{id}
///
/// Update a course. Restricted to the instructor, the school's HOD, or a
/// system admin.
pub async fn update_course(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let updated = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/courses/{id}
///
/// Hard-delete a course. Refused with 409 while sessions or enrollments
/// exist; pending enrollment requests cascade away.
pub async fn delete_course(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let dependents = CourseRepo::dependent_count(&state.pool, id).await?;
    if dependents > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Course has {dependents} dependent records and cannot be deleted"
        ))));
    }

    let deleted = CourseRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = auth.user_id, course_id = id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
    }
}

/// GET /api/v1/courses/{id}/roster
///
/// The enrolled students, visible to whoever manages the course.
pub async fn get_roster(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RosterEntry>>>> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let roster = EnrollmentRepo::roster(&state.pool, id).await?;
    Ok(Json(DataResponse { data: roster }))
}

/// POST /api/v1/courses/{id}/beacon
///
/// Atomically claim a beacon for this course. The claim succeeds only if the
/// beacon is unassigned; an already-assigned beacon yields 409. The beacon
/// must belong to the course's school.
pub async fn assign_beacon(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
    Json(input): Json<AssignBeaconRequest>,
) -> AppResult<Json<DataResponse<attenda_db::models::beacon::BleBeacon>>> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let beacon = BeaconRepo::find_by_id(&state.pool, input.beacon_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Beacon",
            id: input.beacon_id,
        }))?;

    if beacon.school_id != course.school_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Beacon belongs to a different school".into(),
        )));
    }

    // A course holds at most one beacon.
    if BeaconRepo::find_for_course(&state.pool, id).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Course already has an assigned beacon".into(),
        )));
    }

    let assigned = BeaconRepo::assign_to_course(&state.pool, input.beacon_id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Beacon is already assigned to a course".into(),
            ))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        course_id = id,
        beacon_id = assigned.id,
        "Beacon assigned to course"
    );

    Ok(Json(DataResponse { data: assigned }))
}

/// DELETE /api/v1/courses/{id}/beacon
///
/// Release the course's beacon assignment. Returns 204 No Content.
pub async fn unassign_beacon(
    State(state): State<AppState>,
    RequireLecturer(auth): RequireLecturer,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let course = ensure_course_exists(&state.pool, id).await?;
    ensure_course_manage(&state.pool, &auth, &course).await?;

    let released = BeaconRepo::unassign_course(&state.pool, id).await?;
    if released {
        tracing::info!(user_id = auth.user_id, course_id = id, "Beacon unassigned");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::Conflict(
            "Course has no assigned beacon".into(),
        )))
    }
}

/// POST /api/v1/courses/{id}/enroll
///
/// Student self-enrollment. Enrolls directly when the course does not
/// require approval and capacity remains; otherwise files a pending
/// enrollment request. Duplicates conflict (409).
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<EnrollOutcome>>)> {
    // Only approved student accounts enroll; teaching roles manage instead.
    if is_teaching_role(&auth.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only students can enroll in courses".into(),
        )));
    }
    let caller = load_caller(&state.pool, &auth).await?;
    ensure_approved(&caller)?;

    let course = ensure_course_exists(&state.pool, id).await?;
    if !course.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "Course is not open for enrollment".into(),
        )));
    }

    if EnrollmentRepo::exists(&state.pool, id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Already enrolled in this course".into(),
        )));
    }

    let enrolled = EnrollmentRepo::count_for_course(&state.pool, id).await?;
    if enrolled >= i64::from(course.max_students) {
        return Err(AppError::Core(CoreError::Conflict(
            "Course is at capacity".into(),
        )));
    }

    let outcome = if course.approval_required {
        let request = EnrollmentRequestRepo::create(&state.pool, id, auth.user_id).await?;
        tracing::info!(user_id = auth.user_id, course_id = id, "Enrollment requested");
        EnrollOutcome::Requested { request }
    } else {
        let enrollment = EnrollmentRepo::create(&state.pool, id, auth.user_id).await?;
        tracing::info!(user_id = auth.user_id, course_id = id, "Student enrolled");
        EnrollOutcome::Enrolled { enrollment }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a course or fail with 404. Shared with session and analytics handlers.
pub async fn ensure_course_exists(pool: &PgPool, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}
