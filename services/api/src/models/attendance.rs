//! Attendance insert payload

use chrono::NaiveDate;
use common::SessionId;

/// A record about to be stored, with student details already resolved
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub session_id: SessionId,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub course_code: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub timestamp: i64,
}
