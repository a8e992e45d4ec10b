//! Faculty console settings
//!
//! Read from `FACULTY_`-prefixed environment variables layered over defaults.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::console::ConsolePeriods;

#[derive(Debug, Clone, Deserialize)]
pub struct FacultySettings {
    /// Base URL of the attendance service
    pub api_base_url: String,
    pub email: String,
    pub password: String,
    /// Course to open on start; the first listed course when unset
    pub course_code: Option<String>,
    /// QR regeneration period in milliseconds
    pub rotation_millis: u64,
    /// Roster refresh period in milliseconds
    pub poll_millis: u64,
}

impl FacultySettings {
    /// Load settings from the environment
    ///
    /// # Environment Variables
    /// - `FACULTY_API_BASE_URL` (default: `http://localhost:3001`)
    /// - `FACULTY_EMAIL`, `FACULTY_PASSWORD`
    /// - `FACULTY_COURSE_CODE` (optional)
    /// - `FACULTY_ROTATION_MILLIS` (default: 1000)
    /// - `FACULTY_POLL_MILLIS` (default: 2000)
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .set_default("api_base_url", "http://localhost:3001")?
            .set_default("email", "")?
            .set_default("password", "")?
            .set_default("rotation_millis", 1_000_i64)?
            .set_default("poll_millis", 2_000_i64)?
            .add_source(Environment::with_prefix("FACULTY").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.rotation_millis == 0 || settings.poll_millis == 0 {
            return Err(ConfigError::Message(
                "Rotation and poll periods must be positive".to_string(),
            ));
        }

        Ok(settings)
    }

    pub fn periods(&self) -> ConsolePeriods {
        ConsolePeriods {
            rotation: Duration::from_millis(self.rotation_millis),
            poll: Duration::from_millis(self.poll_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "FACULTY_API_BASE_URL",
        "FACULTY_EMAIL",
        "FACULTY_PASSWORD",
        "FACULTY_COURSE_CODE",
        "FACULTY_ROTATION_MILLIS",
        "FACULTY_POLL_MILLIS",
    ];

    fn clear_env() {
        unsafe {
            for var in VARS {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();

        let settings = FacultySettings::load().unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:3001");
        assert_eq!(settings.course_code, None);
        assert_eq!(settings.periods(), ConsolePeriods::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("FACULTY_API_BASE_URL", "http://attendance.local:8080");
            std::env::set_var("FACULTY_EMAIL", "rao@college.edu");
            std::env::set_var("FACULTY_PASSWORD", "secret1");
            std::env::set_var("FACULTY_COURSE_CODE", "CS301");
            std::env::set_var("FACULTY_POLL_MILLIS", "5000");
        }

        let settings = FacultySettings::load().unwrap();
        assert_eq!(settings.api_base_url, "http://attendance.local:8080");
        assert_eq!(settings.email, "rao@college.edu");
        assert_eq!(settings.course_code.as_deref(), Some("CS301"));
        assert_eq!(settings.periods().poll, Duration::from_secs(5));
        assert_eq!(settings.periods().rotation, Duration::from_secs(1));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_period_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("FACULTY_ROTATION_MILLIS", "0");
        }

        assert!(FacultySettings::load().is_err());

        clear_env();
    }
}
