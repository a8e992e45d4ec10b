//! User-facing notifications for scan results

use common::QrError;

use crate::camera::CameraError;
use crate::submission::{DuplicateSource, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn recorded(student_name: &str) -> Self {
        Self::new(
            NoticeLevel::Success,
            "Success!",
            format!("Attendance marked. Welcome, {}!", student_name),
        )
    }

    pub fn already_marked(source: DuplicateSource) -> Self {
        let description = match source {
            DuplicateSource::Local => "You have already marked your attendance for this session.",
            DuplicateSource::Server => "You have already marked your attendance for today's class.",
        };
        Self::new(NoticeLevel::Info, "Already Marked", description)
    }

    pub fn nothing_detected() -> Self {
        Self::new(
            NoticeLevel::Destructive,
            "Scan Failed",
            "Could not detect a QR code. Please try again.",
        )
    }

    pub fn camera_failed(error: &CameraError) -> Self {
        Self::new(NoticeLevel::Destructive, error.title(), error.to_string())
    }

    pub fn submit_failed(error: &SubmitError) -> Self {
        match error {
            SubmitError::InvalidPayload(QrError::Empty) => Self::nothing_detected(),
            SubmitError::InvalidPayload(_) => Self::new(
                NoticeLevel::Destructive,
                "Scan Error",
                "Invalid QR Code format. Please scan the correct code.",
            ),
            SubmitError::Rejected { message, .. } => {
                Self::new(NoticeLevel::Destructive, "Scan Error", message.clone())
            }
            SubmitError::Transport(_) => Self::new(
                NoticeLevel::Destructive,
                "Scan Error",
                "Could not reach the attendance service. Please try again.",
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Destructive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_duplicates_are_not_errors() {
        assert!(!Notice::already_marked(DuplicateSource::Local).is_error());
        assert!(!Notice::already_marked(DuplicateSource::Server).is_error());
        assert!(!Notice::recorded("Asha").is_error());
    }

    #[test]
    fn test_failures_are_destructive() {
        let failures = [
            Notice::submit_failed(&SubmitError::InvalidPayload(QrError::MissingSessionId)),
            Notice::submit_failed(&SubmitError::Rejected {
                status: StatusCode::BAD_REQUEST,
                message: "Student not found".to_string(),
            }),
            Notice::submit_failed(&SubmitError::Transport("connection refused".to_string())),
            Notice::camera_failed(&CameraError::PermissionDenied),
        ];

        assert!(failures.iter().all(Notice::is_error));
        assert_eq!(failures[1].description, "Student not found");
    }

    #[test]
    fn test_blank_scan_reads_as_nothing_detected() {
        assert_eq!(
            Notice::submit_failed(&SubmitError::InvalidPayload(QrError::Empty)),
            Notice::nothing_detected()
        );
    }

    #[test]
    fn test_insecure_context_title() {
        let notice = Notice::camera_failed(&CameraError::InsecureContext);
        assert_eq!(notice.title, "HTTPS Required");
        assert!(notice.description.starts_with("Camera access requires HTTPS"));
    }
}
