//! Error types for the sources console.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

/// Result type alias using the sources console's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a remote API collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Raw response body, used when the collaborator gives no `detail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ApiError {
    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Default::default()
        }
    }

    pub fn with_data(data: JsonValue) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// `detail`, falling back to the raw `data` body.
    pub fn detail_or_data(&self) -> Option<String> {
        self.detail
            .clone()
            .filter(|detail| !detail.is_empty())
            .or_else(|| {
                self.data.as_ref().map(|data| match data {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
    }

    /// Normalize into the `{detail, title}` shape stored on list rejection.
    pub fn normalized(&self, title: impl Into<String>) -> LoadError {
        LoadError {
            detail: self.detail_or_data(),
            title: title.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.title.as_deref(), self.detail_or_data()) {
            (Some(title), Some(detail)) => write!(f, "{}: {}", title, detail),
            (Some(title), None) => write!(f, "{}", title),
            (None, Some(detail)) => write!(f, "{}", detail),
            (None, None) => write!(f, "unknown API failure"),
        }
    }
}

/// Normalized list-load failure kept in shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    pub detail: Option<String>,
    pub title: String,
}

/// Core error type for sources console operations.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// An authentication type code has no name in its source type's schema.
    #[error("Data integrity error: source type '{source_type}' declares no authentication named for type '{auth_type}'")]
    DataIntegrity {
        source_type: String,
        auth_type: String,
    },

    /// A remote collaborator call failed
    #[error("API error: {0}")]
    Api(ApiError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The collaborator failure, if this error came from one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Error::Api(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
