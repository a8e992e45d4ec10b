//! Wire models shared by the attendance service and its clients
//!
//! Every payload serializes with camelCase keys so the JSON matches what the
//! dashboards send and expect.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error body returned when a student scans a session they are already recorded for
pub const DUPLICATE_ATTENDANCE: &str = "Attendance already marked for today";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Identifier of one live teaching session
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build the id for a session of `course_id` opened at `created_at_millis` on `date`.
    ///
    /// The creation instant makes a second session of the same course on the
    /// same day distinct; the date keeps ids from different days apart.
    pub fn derive(course_id: &str, created_at_millis: i64, date: NaiveDate) -> Self {
        Self(format!(
            "session_{}_{}_{}",
            course_id,
            created_at_millis,
            date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Public view of an account, returned on sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

/// Request for account creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
}

/// Request for user login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response for user login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub message: String,
    pub user: UserProfile,
}

/// One student on a course roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student_id: String,
    pub student_name: String,
}

/// Course creation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCourse {
    pub teacher_id: String,
    pub name: String,
    pub course_code: String,
    pub class_id: String,
    pub day: String,
    pub time: String,
    pub end_time: String,
    pub room_no: String,
    pub student_list: Vec<RosterEntry>,
}

/// A scheduled class owned by one faculty member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub teacher_id: String,
    pub name: String,
    pub course_code: String,
    pub class_id: String,
    pub day: String,
    pub time: String,
    pub end_time: String,
    pub room_no: String,
    #[serde(default)]
    pub student_list: Vec<RosterEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCreatedResponse {
    pub message: String,
    pub course: Course,
}

/// Body a student client posts after decoding a session QR code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceSubmission {
    pub session_id: SessionId,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// A persisted scan: this student attended this session on this date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub session_id: SessionId,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub course_code: String,
    pub class_id: String,
    pub date: NaiveDate,
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_derive_format() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let id = SessionId::derive("c1", 1714550400123, date);
        assert_eq!(id.as_str(), "session_c1_1714550400123_2024-05-01");
    }

    #[test]
    fn test_session_id_differs_per_creation_instant() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_ne!(
            SessionId::derive("c1", 1, date),
            SessionId::derive("c1", 2, date)
        );
    }

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert_eq!("faculty".parse::<Role>(), Ok(Role::Faculty));
        assert!("Teacher".parse::<Role>().is_err());
        assert_eq!(Role::Faculty.to_string(), "faculty");
    }

    #[test]
    fn test_submission_uses_camel_case_keys() {
        let submission = AttendanceSubmission {
            session_id: SessionId::new("s1"),
            student_id: "en001".to_string(),
            student_name: Some("Asha".to_string()),
            student_email: Some("en001@college.edu".to_string()),
            course_code: Some("CS301".to_string()),
            class_id: Some("A1".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["sessionId"], "s1");
        assert_eq!(value["studentId"], "en001");
        assert_eq!(value["studentEmail"], "en001@college.edu");
        assert_eq!(value["courseCode"], "CS301");
        assert_eq!(value["classId"], "A1");
        assert_eq!(value["date"], "2024-05-01");
    }

    #[test]
    fn test_submission_tolerates_missing_fields() {
        let submission: AttendanceSubmission =
            serde_json::from_str(r#"{"studentId":"en001"}"#).unwrap();
        assert!(submission.session_id.is_blank());
        assert_eq!(submission.date, None);
    }
}
