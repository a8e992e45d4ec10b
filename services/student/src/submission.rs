//! Attendance submission
//!
//! Turns decoded QR text into a submission for the attendance service and
//! interprets the reply. A session already recorded, whether remembered
//! locally or reported by the server, is an outcome rather than an error.

use async_trait::async_trait;
use common::models::{AttendanceSubmission, ErrorResponse, MessageResponse, UserProfile};
use common::{DUPLICATE_ATTENDANCE, QrError, SessionId, qr};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::guard::DuplicateGuard;

/// The signed-in student submitting scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub student_id: String,
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Identity of a signed-in account; the enrollment number defaults to the email's local part
    pub fn from_profile(profile: &UserProfile) -> Self {
        let student_id = profile.student_id.clone().unwrap_or_else(|| {
            profile
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

        Self {
            student_id,
            name: profile.name.clone(),
            email: profile.email.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidPayload(#[from] QrError),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Could not reach the attendance service: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateSource {
    /// Skipped before any request was made
    Local,
    /// Reported by the attendance service
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded { session_id: SessionId },
    AlreadyMarked(DuplicateSource),
}

/// Endpoint accepting attendance submissions
#[async_trait]
pub trait AttendanceGateway: Send + Sync {
    async fn submit(&self, submission: &AttendanceSubmission) -> Result<MessageResponse, SubmitError>;
}

/// Gateway posting to the attendance service over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AttendanceGateway for HttpGateway {
    async fn submit(&self, submission: &AttendanceSubmission) -> Result<MessageResponse, SubmitError> {
        let response = self
            .http
            .post(format!("{}/api/attendance", self.base_url))
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<MessageResponse>()
                .await
                .map_err(|e| SubmitError::Transport(e.to_string()));
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string(),
        };
        Err(SubmitError::Rejected { status, message })
    }
}

fn is_server_duplicate(error: &SubmitError) -> bool {
    matches!(
        error,
        SubmitError::Rejected { status, message }
            if *status == StatusCode::CONFLICT || message == DUPLICATE_ATTENDANCE
    )
}

/// Submit one decoded scan
///
/// The guard is consulted before any request and updated only when the
/// service acknowledges the record, so a rejected scan can be retried.
pub async fn submit_scan(
    guard: &mut DuplicateGuard,
    gateway: &dyn AttendanceGateway,
    raw: &str,
    identity: &Identity,
) -> Result<SubmitOutcome, SubmitError> {
    let payload = qr::decode(raw)?;

    if guard.is_duplicate(&payload.session_id) {
        debug!("Session {} already submitted", payload.session_id);
        return Ok(SubmitOutcome::AlreadyMarked(DuplicateSource::Local));
    }

    let submission = AttendanceSubmission {
        session_id: payload.session_id.clone(),
        student_id: identity.student_id.clone(),
        student_name: Some(identity.name.clone()),
        student_email: Some(identity.email.clone()),
        course_code: payload.course_code,
        class_id: payload.class_id,
        date: payload.date,
    };

    match gateway.submit(&submission).await {
        Ok(_) => {
            info!(
                "Attendance recorded for {} in {}",
                identity.student_id, payload.session_id
            );
            guard.remember(payload.session_id.clone());
            Ok(SubmitOutcome::Recorded {
                session_id: payload.session_id,
            })
        }
        Err(e) if is_server_duplicate(&e) => {
            Ok(SubmitOutcome::AlreadyMarked(DuplicateSource::Server))
        }
        Err(e) => Err(e),
    }
}
