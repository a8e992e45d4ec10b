//! HTTP client for the attendance service

use async_trait::async_trait;
use common::SessionId;
use common::models::{
    AttendanceRecord, Course, CourseCreatedResponse, CoursesResponse, ErrorResponse, NewCourse,
    RecordsResponse, SignInRequest, SignInResponse, UserProfile,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Where the console fetches a session's roster from
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn session_records(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceRecord>, ClientError>;
}

/// Faculty-side client of the attendance service
#[derive(Debug, Clone)]
pub struct FacultyClient {
    http: Client,
    base_url: String,
}

impl FacultyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/signin"))
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let body: SignInResponse = read_json(response).await?;
        info!("Signed in as {} ({})", body.user.email, body.user.role);
        Ok(body.user)
    }

    pub async fn courses(&self, teacher_id: &str) -> Result<Vec<Course>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/courses"))
            .query(&[("teacherId", teacher_id)])
            .send()
            .await?;

        let body: CoursesResponse = read_json(response).await?;
        Ok(body.courses)
    }

    pub async fn add_course(&self, course: &NewCourse) -> Result<Course, ClientError> {
        let response = self
            .http
            .post(self.url("/api/courses"))
            .json(course)
            .send()
            .await?;

        let body: CourseCreatedResponse = read_json(response).await?;
        info!(
            "Added course {} with {} students",
            body.course.course_code,
            body.course.student_list.len()
        );
        Ok(body.course)
    }

    pub async fn delete_course(&self, course_id: Uuid, teacher_id: &str) -> Result<(), ClientError> {
        let course_id = course_id.to_string();
        let response = self
            .http
            .delete(self.url("/api/courses"))
            .query(&[("courseId", course_id.as_str()), ("teacherId", teacher_id)])
            .send()
            .await?;

        ensure_success(response).await?;
        info!("Deleted course {}", course_id);
        Ok(())
    }

    /// Every record for any of the teacher's courses, newest first
    pub async fn all_records(&self, teacher_id: &str) -> Result<Vec<AttendanceRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/attendance/all"))
            .query(&[("teacherId", teacher_id)])
            .send()
            .await?;

        let body: RecordsResponse = read_json(response).await?;
        Ok(body.records)
    }
}

#[async_trait]
impl RosterSource for FacultyClient {
    async fn session_records(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/attendance"))
            .query(&[("sessionId", session_id.as_str())])
            .send()
            .await?;

        let body: RecordsResponse = read_json(response).await?;
        debug!("{} records for {}", body.records.len(), session_id);
        Ok(body.records)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    };
    Err(ClientError::Api { status, message })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(ensure_success(response).await?.json::<T>().await?)
}
