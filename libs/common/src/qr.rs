//! QR payload codec
//!
//! The text carried inside a session QR symbol is a flat JSON object. Only
//! `sessionId` is mandatory: it is the identity key the scanning side acts on.
//! The remaining fields describe the class and carry a freshness timestamp
//! that changes on every rotation.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::SessionId;

/// Structured content of a session QR symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub session_id: SessionId,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub teacher_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub class_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    /// Milliseconds since the Unix epoch at which this frame was generated
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,
}

/// Optional field that reads as `None` when its value has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Why a scanned string was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrError {
    #[error("QR code is empty")]
    Empty,

    #[error("Invalid QR code format: {0}")]
    Malformed(String),

    #[error("Invalid QR code: missing session ID")]
    MissingSessionId,
}

impl QrPayload {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            course_id: None,
            teacher_id: None,
            course_code: None,
            class_id: None,
            date: None,
            timestamp: None,
        }
    }
}

/// Serialize a payload into the text placed in the QR symbol
pub fn encode(payload: &QrPayload) -> Result<String, QrError> {
    if payload.session_id.is_blank() {
        return Err(QrError::MissingSessionId);
    }
    serde_json::to_string(payload).map_err(|e| QrError::Malformed(e.to_string()))
}

/// Parse scanned text back into a payload
///
/// Anything other than a JSON object carrying a non-blank `sessionId` is
/// rejected. Unknown keys are ignored, and descriptive fields whose values
/// have an unexpected type decode as absent.
pub fn decode(text: &str) -> Result<QrPayload, QrError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QrError::Empty);
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| QrError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(QrError::Malformed("expected a JSON object".to_string()));
    }
    let payload =
        QrPayload::deserialize(value).map_err(|e| QrError::Malformed(e.to_string()))?;

    if payload.session_id.is_blank() {
        return Err(QrError::MissingSessionId);
    }

    Ok(payload)
}
