//! In-process store
//!
//! Mirrors the PostgreSQL behaviour closely enough to run the full HTTP
//! surface in tests and in local demos (`API_STORAGE=memory`).

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::SessionId;
use common::error::DatabaseResult;
use common::models::{AttendanceRecord, Course, NewCourse, Role};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AttendanceStore, CourseStore, Store, UserStore};
use crate::models::{NewAttendance, NewUser, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    courses: Mutex<Vec<Course>>,
    attendance: Mutex<Vec<AttendanceRecord>>,
    inserts: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attendance inserts performed since creation
    pub fn attendance_inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            role: new_user.role,
            external_id: new_user.external_id,
            created_at: Utc::now(),
        };
        self.users.lock().await.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_student(&self, student_id: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.role == Role::Student && u.external_id == student_id)
            .cloned())
    }

    async fn count_users(&self, role: Role) -> DatabaseResult<u64> {
        let users = self.users.lock().await;
        Ok(users.iter().filter(|u| u.role == role).count() as u64)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, new_course: NewCourse) -> DatabaseResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            teacher_id: new_course.teacher_id,
            name: new_course.name,
            course_code: new_course.course_code,
            class_id: new_course.class_id,
            day: new_course.day,
            time: new_course.time,
            end_time: new_course.end_time,
            room_no: new_course.room_no,
            student_list: new_course.student_list,
            created_at: Utc::now(),
        };
        self.courses.lock().await.push(course.clone());
        Ok(course)
    }

    async fn courses_for_teacher(&self, teacher_id: &str) -> DatabaseResult<Vec<Course>> {
        let courses = self.courses.lock().await;
        Ok(courses
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect())
    }

    async fn delete_course(&self, course_id: Uuid, teacher_id: &str) -> DatabaseResult<bool> {
        let mut courses = self.courses.lock().await;
        let before = courses.len();
        courses.retain(|c| !(c.id == course_id && c.teacher_id == teacher_id));
        Ok(courses.len() < before)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_attendance(
        &self,
        session_id: &SessionId,
        student_id: &str,
        date: NaiveDate,
    ) -> DatabaseResult<Option<AttendanceRecord>> {
        let records = self.attendance.lock().await;
        Ok(records
            .iter()
            .find(|r| &r.session_id == session_id && r.student_id == student_id && r.date == date)
            .cloned())
    }

    async fn insert_attendance(&self, record: NewAttendance) -> DatabaseResult<AttendanceRecord> {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            session_id: record.session_id,
            student_id: record.student_id,
            student_name: record.student_name,
            student_email: record.student_email,
            course_code: record.course_code,
            class_id: record.class_id,
            date: record.date,
            timestamp: record.timestamp,
            created_at: Utc::now(),
        };
        self.attendance.lock().await.push(record.clone());
        self.inserts.fetch_add(1, Ordering::Relaxed);
        Ok(record)
    }

    async fn attendance_for_session(
        &self,
        session_id: &SessionId,
    ) -> DatabaseResult<Vec<AttendanceRecord>> {
        let records = self.attendance.lock().await;
        let mut matching: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| &r.session_id == session_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }

    async fn attendance_for_courses(
        &self,
        course_codes: &[String],
        class_ids: &[String],
    ) -> DatabaseResult<Vec<AttendanceRecord>> {
        let records = self.attendance.lock().await;
        let mut matching: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| course_codes.contains(&r.course_code) || class_ids.contains(&r.class_id))
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        Ok(matching)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }

    async fn reset(&self) -> DatabaseResult<()> {
        self.users.lock().await.clear();
        self.courses.lock().await.clear();
        self.attendance.lock().await.clear();
        Ok(())
    }
}
