//! Storage-side models for the attendance service
//!
//! Wire payloads live in [`common::models`]; these types carry the fields that
//! never leave the service, such as password hashes.

pub mod attendance;
pub mod user;

pub use attendance::NewAttendance;
pub use user::{NewUser, User};
