//! Live teaching sessions

use chrono::{DateTime, NaiveDate, Utc};
use common::models::Course;
use common::{QrPayload, SessionId};

/// One course being taught right now
///
/// Exists only while the faculty console has it open. The session id is fixed
/// at start; every QR frame generated afterwards differs only in its
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    pub session_id: SessionId,
    pub course_id: String,
    pub teacher_id: String,
    pub course_code: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
}

impl LiveSession {
    pub fn start(course: &Course, teacher_id: &str, now: DateTime<Utc>) -> Self {
        let course_id = course.id.to_string();
        let date = now.date_naive();

        Self {
            session_id: SessionId::derive(&course_id, now.timestamp_millis(), date),
            course_id,
            teacher_id: teacher_id.to_string(),
            course_code: course.course_code.clone(),
            class_id: course.class_id.clone(),
            date,
            started_at: now,
        }
    }

    /// QR frame content stamped with `now`
    pub fn payload_at(&self, now: DateTime<Utc>) -> QrPayload {
        QrPayload {
            course_id: Some(self.course_id.clone()),
            teacher_id: Some(self.teacher_id.clone()),
            course_code: Some(self.course_code.clone()),
            class_id: Some(self.class_id.clone()),
            date: Some(self.date),
            timestamp: Some(now.timestamp_millis()),
            ..QrPayload::new(self.session_id.clone())
        }
    }

    pub fn is_for_course(&self, course_id: &str) -> bool {
        self.course_id == course_id
    }
}
