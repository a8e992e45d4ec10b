//! User model and related functionality

use chrono::{DateTime, Utc};
use common::models::{Role, UserProfile};
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    /// Enrollment number for students, staff id for faculty
    pub external_id: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view returned to the dashboards
    pub fn profile(&self) -> UserProfile {
        let (student_id, teacher_id) = match self.role {
            Role::Student => (Some(self.external_id.clone()), None),
            Role::Faculty => (None, Some(self.external_id.clone())),
        };

        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            student_id,
            teacher_id,
        }
    }
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub external_id: String,
}

/// Enrollment number implied by a student email: its local part
pub fn enrollment_from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Generated staff id for the `ordinal`-th faculty account, e.g. `TCH001`
pub fn generated_staff_id(ordinal: u64) -> String {
    format!("TCH{:03}", ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_from_email() {
        assert_eq!(enrollment_from_email("en001@college.edu"), "en001");
        assert_eq!(enrollment_from_email("plain"), "plain");
    }

    #[test]
    fn test_generated_staff_id() {
        assert_eq!(generated_staff_id(1), "TCH001");
        assert_eq!(generated_staff_id(42), "TCH042");
        assert_eq!(generated_staff_id(1234), "TCH1234");
    }

    #[test]
    fn test_profile_exposes_role_specific_id() {
        let user = User {
            id: Uuid::new_v4(),
            email: "en001@college.edu".to_string(),
            password_hash: "hash".to_string(),
            name: "Asha".to_string(),
            role: Role::Student,
            external_id: "en001".to_string(),
            created_at: Utc::now(),
        };

        let profile = user.profile();
        assert_eq!(profile.student_id.as_deref(), Some("en001"));
        assert_eq!(profile.teacher_id, None);
    }
}
