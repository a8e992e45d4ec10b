//! Attendance service routes

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use common::DUPLICATE_ATTENDANCE;
use common::models::{
    AttendanceSubmission, CourseCreatedResponse, CoursesResponse, MessageResponse, NewCourse,
    RecordsResponse, Role, SignInRequest, SignInResponse, SignUpRequest,
};
use common::SessionId;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{NewAttendance, NewUser, user},
    password,
    repositories::{AttendanceStore, CourseStore, Store, UserStore},
    validation,
};

/// Query carrying the owning faculty member
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherQuery {
    pub teacher_id: Option<String>,
}

/// Query identifying a course to delete
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCourseQuery {
    pub course_id: Option<String>,
    pub teacher_id: Option<String>,
}

/// Query selecting one live session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

/// Create the router for the attendance service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in))
        .route(
            "/api/courses",
            post(create_course).get(list_courses).delete(delete_course),
        )
        .route(
            "/api/attendance",
            post(mark_attendance).get(session_attendance),
        )
        .route("/api/attendance/all", get(teacher_attendance))
        .route("/api/reset", post(reset))
        .with_state(state)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.store.health_check().await.unwrap_or_else(|e| {
        error!("Storage health check failed: {}", e);
        false
    });

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "service": "attendance-api",
            "storage": state.store.backend(),
        })),
    )
}

/// Account creation endpoint
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = body?;
    let email = payload.email.trim().to_string();
    let name = payload.name.trim().to_string();

    if email.is_empty() || payload.password.is_empty() || name.is_empty() || payload.role.is_empty()
    {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    }

    let role = payload
        .role
        .parse::<Role>()
        .map_err(|_| ApiError::BadRequest("Invalid role".to_string()))?;

    validation::validate_email(&email).map_err(ApiError::BadRequest)?;
    validation::validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let external_id = match role {
        Role::Student => non_blank(payload.enrollment_number)
            .unwrap_or_else(|| user::enrollment_from_email(&email).to_string()),
        Role::Faculty => match non_blank(payload.staff_id) {
            Some(staff_id) => staff_id,
            None => user::generated_staff_id(state.store.count_users(Role::Faculty).await? + 1),
        },
    };

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })?;

    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            name,
            role,
            external_id,
        })
        .await?;

    info!(
        "Created {} account {} ({})",
        user.role, user.email, user.external_id
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// User login endpoint
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = body?;
    let email = payload.email.trim();

    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    }

    if !state.rate_limiter.is_allowed(email).await {
        return Err(ApiError::TooManyRequests);
    }

    let user = state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&user.password_hash, &payload.password).map_err(|e| {
        error!("Failed to verify password for {}: {}", email, e);
        ApiError::InternalServerError
    })?;

    if !valid {
        info!("Rejected sign-in for {}", email);
        return Err(ApiError::InvalidCredentials);
    }

    state.rate_limiter.reset(email).await;
    info!("Sign-in for {} ({})", user.email, user.role);

    Ok(Json(SignInResponse {
        message: "Login successful".to_string(),
        user: user.profile(),
    }))
}

/// Create a course for a faculty member
pub async fn create_course(
    State(state): State<AppState>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(mut payload) = body?;
    validation::require("Teacher ID", &payload.teacher_id).map_err(ApiError::BadRequest)?;
    validation::require("Name", &payload.name).map_err(ApiError::BadRequest)?;
    validation::require("Course code", &payload.course_code).map_err(ApiError::BadRequest)?;
    validation::require("Class ID", &payload.class_id).map_err(ApiError::BadRequest)?;

    if !payload.time.is_empty() {
        validation::validate_clock_time("Start time", &payload.time)
            .map_err(ApiError::BadRequest)?;
    }
    if !payload.end_time.is_empty() {
        validation::validate_clock_time("End time", &payload.end_time)
            .map_err(ApiError::BadRequest)?;
    }

    payload.student_list.retain(|entry| {
        !entry.student_id.trim().is_empty() && !entry.student_name.trim().is_empty()
    });

    let course = state.store.create_course(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseCreatedResponse {
            message: "Course added successfully".to_string(),
            course,
        }),
    ))
}

/// List the courses owned by a faculty member
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<TeacherQuery>,
) -> ApiResult<impl IntoResponse> {
    let teacher_id = non_blank(query.teacher_id)
        .ok_or_else(|| ApiError::BadRequest("Teacher ID required".to_string()))?;

    let courses = state.store.courses_for_teacher(&teacher_id).await?;

    Ok(Json(CoursesResponse { courses }))
}

/// Delete a course, only on behalf of its owner
pub async fn delete_course(
    State(state): State<AppState>,
    Query(query): Query<DeleteCourseQuery>,
) -> ApiResult<impl IntoResponse> {
    let (Some(course_id), Some(teacher_id)) =
        (non_blank(query.course_id), non_blank(query.teacher_id))
    else {
        return Err(ApiError::BadRequest(
            "Course ID and Teacher ID required".to_string(),
        ));
    };

    let not_found = || ApiError::NotFound("Course not found or unauthorized".to_string());
    let course_id = Uuid::parse_str(&course_id).map_err(|_| not_found())?;

    if !state.store.delete_course(course_id, &teacher_id).await? {
        return Err(not_found());
    }

    info!("Course {} deleted by {}", course_id, teacher_id);
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

/// Record that a student scanned a session code
pub async fn mark_attendance(
    State(state): State<AppState>,
    body: Result<Json<AttendanceSubmission>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(submission) = body?;
    if submission.session_id.is_blank() {
        return Err(ApiError::BadRequest("Session ID required".to_string()));
    }
    let student_id = submission.student_id.trim();
    if student_id.is_empty() {
        return Err(ApiError::BadRequest("Student ID required".to_string()));
    }

    let student = state
        .store
        .find_student(student_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Student not found".to_string()))?;

    let date = submission.date.unwrap_or_else(|| Utc::now().date_naive());

    // Check-then-insert; concurrent duplicates for the same triple are not excluded.
    if state
        .store
        .find_attendance(&submission.session_id, student_id, date)
        .await?
        .is_some()
    {
        info!(
            "Duplicate scan of {} by {}",
            submission.session_id, student_id
        );
        return Err(ApiError::Conflict(DUPLICATE_ATTENDANCE.to_string()));
    }

    let record = state
        .store
        .insert_attendance(NewAttendance {
            session_id: submission.session_id,
            student_id: student.external_id.clone(),
            student_name: student.name.clone(),
            student_email: student.email.clone(),
            course_code: submission.course_code.unwrap_or_default(),
            class_id: submission.class_id.unwrap_or_default(),
            date,
            timestamp: Utc::now().timestamp_millis(),
        })
        .await?;

    info!(
        "Attendance saved: {} for {} in {}",
        record.id, student.name, record.session_id
    );

    Ok(Json(MessageResponse::new("Attendance marked successfully")))
}

/// Roster of one live session, oldest scan first
pub async fn session_attendance(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<impl IntoResponse> {
    let session_id = non_blank(query.session_id)
        .map(SessionId::new)
        .ok_or_else(|| ApiError::BadRequest("Session ID required".to_string()))?;

    let records = state.store.attendance_for_session(&session_id).await?;

    Ok(Json(RecordsResponse { records }))
}

/// Every record for any of a faculty member's courses, newest first
pub async fn teacher_attendance(
    State(state): State<AppState>,
    Query(query): Query<TeacherQuery>,
) -> ApiResult<impl IntoResponse> {
    let teacher_id = non_blank(query.teacher_id)
        .ok_or_else(|| ApiError::BadRequest("Teacher ID required".to_string()))?;

    let courses = state.store.courses_for_teacher(&teacher_id).await?;
    let course_codes: Vec<String> = courses.iter().map(|c| c.course_code.clone()).collect();
    let class_ids: Vec<String> = courses.iter().map(|c| c.class_id.clone()).collect();

    let records = state
        .store
        .attendance_for_courses(&course_codes, &class_ids)
        .await?;

    info!(
        "Found {} attendance records for {}",
        records.len(),
        teacher_id
    );

    Ok(Json(RecordsResponse { records }))
}

/// Wipe all collections, when enabled
pub async fn reset(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    if !state.config.enable_reset {
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    state.store.reset().await?;
    warn!("All users, courses and attendance records were deleted");

    Ok(Json(MessageResponse::new("Database reset successfully")))
}
