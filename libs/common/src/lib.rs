//! Common library for the attendance workspace
//!
//! This crate provides functionality shared by the attendance service and its
//! faculty and student clients: database connectivity, error handling, the
//! JSON wire models and the QR payload codec.

pub mod database;
pub mod error;
pub mod models;
pub mod qr;

pub use models::{DUPLICATE_ATTENDANCE, SessionId};
pub use qr::{QrError, QrPayload};
