//! Error types for the BusWay API client

use crate::types::FieldErrors;
use thiserror::Error;

/// Errors that can occur when talking to the booking API
#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not a valid absolute URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Credentials rejected or token missing/expired
    #[error("Unauthorized: {}", detail.as_deref().unwrap_or("authentication required"))]
    Unauthorized {
        /// Server-supplied explanation
        detail: Option<String>,
    },

    /// The server refused the request
    #[error("Request rejected (status {status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Server-supplied explanation
        detail: Option<String>,
    },

    /// Form validation failed, errors keyed by field
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
}

impl ApiError {
    /// The server-supplied `detail` message, if any
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Rejected { detail, .. } => detail.as_deref(),
            Self::InvalidBaseUrl(_)
            | Self::RequestFailed(_)
            | Self::ResponseParseFailed(_)
            | Self::Validation(_) => None,
        }
    }

    /// Field errors from a failed form submission
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
