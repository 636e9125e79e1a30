//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. The request body of `/calculate` and
//! `/validate` is `spo_core::RewriteRequest`; the success body of
//! `/calculate` is `spo_core::NodeLinkGraph`.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use spo_core::SpoError;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Pipeline stage that failed: "request", "match", "gluing", ...
    pub stage: String,
    /// Stable snake_case error kind.
    pub kind: String,
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn from_error(err: &SpoError) -> Self {
        Self {
            success: false,
            stage: err.stage().to_string(),
            kind: err.kind().to_string(),
            error: err.to_string(),
        }
    }

    /// A body that could not be decoded as a rewrite request.
    #[must_use]
    pub fn invalid_body(detail: String) -> Self {
        Self {
            success: false,
            stage: "request".to_string(),
            kind: "invalid_body".to_string(),
            error: detail,
        }
    }

    /// The global request quota is spent.
    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            success: false,
            stage: "request".to_string(),
            kind: "rate_limited".to_string(),
            error: "too many requests, retry shortly".to_string(),
        }
    }
}

/// HTTP status for a pipeline error.
///
/// Malformed input is the client's request being wrong (400); a well-formed
/// rule that does not apply is unprocessable (422).
#[must_use]
pub fn status_for(err: &SpoError) -> StatusCode {
    match err {
        SpoError::Format(_) | SpoError::SerializationError(_) => StatusCode::BAD_REQUEST,
        SpoError::Builder(_) | SpoError::Match(_) | SpoError::Rewrite(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SpoError::ConfigError(_) | SpoError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// VALIDATE RESPONSE
// =============================================================================

/// Result of checking a match without rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            success: true,
            valid: true,
            stage: None,
            kind: None,
            error: None,
        }
    }

    /// The request was well formed but the match is not a valid morphism.
    #[must_use]
    pub fn invalid(err: &SpoError) -> Self {
        Self {
            success: true,
            valid: false,
            stage: Some(err.stage().to_string()),
            kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
        }
    }
}
