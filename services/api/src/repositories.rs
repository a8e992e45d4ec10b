//! Repositories for database operations
//!
//! Handlers talk to storage through the [`Store`] trait so the same routes
//! run against PostgreSQL ([`PgStore`]) or the in-process [`MemoryStore`].

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::DatabaseResult;
use common::models::{AttendanceRecord, Course, NewCourse, Role};
use common::SessionId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewAttendance, NewUser, User};

pub mod attendance;
pub mod course;
pub mod memory;
pub mod user;

pub use memory::MemoryStore;

/// Account storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User>;

    /// Find an account by exact email
    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Find a student by enrollment number
    async fn find_student(&self, student_id: &str) -> DatabaseResult<Option<User>>;

    /// Number of accounts holding `role`
    async fn count_users(&self, role: Role) -> DatabaseResult<u64>;
}

/// Course storage
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Insert a new course
    async fn create_course(&self, new_course: NewCourse) -> DatabaseResult<Course>;

    /// All courses owned by `teacher_id`
    async fn courses_for_teacher(&self, teacher_id: &str) -> DatabaseResult<Vec<Course>>;

    /// Delete a course if `teacher_id` owns it; reports whether anything was removed
    async fn delete_course(&self, course_id: Uuid, teacher_id: &str) -> DatabaseResult<bool>;
}

/// Attendance storage
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Look up the record for one student in one session on one date
    async fn find_attendance(
        &self,
        session_id: &SessionId,
        student_id: &str,
        date: NaiveDate,
    ) -> DatabaseResult<Option<AttendanceRecord>>;

    /// Insert a record without any uniqueness check
    async fn insert_attendance(&self, record: NewAttendance) -> DatabaseResult<AttendanceRecord>;

    /// Records of a session, oldest first
    async fn attendance_for_session(
        &self,
        session_id: &SessionId,
    ) -> DatabaseResult<Vec<AttendanceRecord>>;

    /// Records matching any of the course codes or class ids, newest first
    async fn attendance_for_courses(
        &self,
        course_codes: &[String],
        class_ids: &[String],
    ) -> DatabaseResult<Vec<AttendanceRecord>>;
}

/// Everything the attendance service needs from storage
#[async_trait]
pub trait Store: UserStore + CourseStore + AttendanceStore {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Check storage connectivity
    async fn health_check(&self) -> DatabaseResult<bool>;

    /// Remove every user, course and attendance record
    async fn reset(&self) -> DatabaseResult<()>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }

    async fn reset(&self) -> DatabaseResult<()> {
        sqlx::query("TRUNCATE attendance, courses, users")
            .execute(&self.pool)
            .await
            .map_err(common::error::DatabaseError::Query)?;
        Ok(())
    }
}
