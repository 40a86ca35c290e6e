use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::value_to_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Validation,
    Internal,
    Other,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 409 => Self::BadRequest,
            404 => Self::NotFound,
            422 => Self::Validation,
            500..=599 => Self::Internal,
            _ => Self::Other,
        }
    }
}

/// Error body of a rejected mutation: `{"detail": ...}`.
///
/// Non-string details (for instance a validation error list) are kept as their
/// JSON text so they can still be shown verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, deserialize_with = "detail_text")]
    pub detail: Option<String>,
}

fn detail_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?).filter(|detail| !detail.is_empty()))
}

/// A non-2xx answer to a signup or removal request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?} ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
pub struct ApiRejection {
    pub status: u16,
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl ApiRejection {
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            detail,
        }
    }
}
