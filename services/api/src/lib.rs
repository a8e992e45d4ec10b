//! Attendance persistence service
//!
//! REST boundary used by the faculty and student dashboards: accounts,
//! courses and attendance records.

pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::{ApiConfig, StorageBackend};
pub use routes::create_router;
pub use state::AppState;
