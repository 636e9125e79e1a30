//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use spo_core::{FormatError, GraphRole, MatchError, NodeId, RewriteError, SpoError};
use spo_rewriter::api::{ErrorResponse, HealthResponse, ValidateResponse, status_for};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_from_match_error() {
    let err: SpoError = MatchError::IncompleteMatch { missing: NodeId(2) }.into();
    let body = ErrorResponse::from_error(&err);

    assert!(!body.success);
    assert_eq!(body.stage, "match");
    assert_eq!(body.kind, "incomplete_match");
    assert!(body.error.contains('2'));
}

#[test]
fn test_error_response_serialization() {
    let err: SpoError = RewriteError::AmbiguousGluing {
        first: NodeId(1),
        second: NodeId(2),
        lhs: NodeId(1),
    }
    .into();

    let json = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["stage"], "gluing");
    assert_eq!(json["kind"], "ambiguous_gluing");
    assert!(json["error"].is_string());
}

#[test]
fn test_invalid_body_response() {
    let body = ErrorResponse::invalid_body("expected value".to_string());
    assert_eq!(body.stage, "request");
    assert_eq!(body.kind, "invalid_body");
    assert_eq!(body.error, "expected value");
}

#[test]
fn test_rate_limited_response() {
    let json = serde_json::to_value(ErrorResponse::rate_limited()).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["stage"], "request");
    assert_eq!(json["kind"], "rate_limited");
}

// =============================================================================
// STATUS MAPPING TESTS
// =============================================================================

#[test]
fn test_format_errors_are_bad_requests() {
    let err: SpoError = FormatError::SelfLoop {
        role: GraphRole::Lhs,
        node: NodeId(1),
    }
    .into();
    assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    assert_eq!(
        status_for(&SpoError::SerializationError("bad".to_string())),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_rule_errors_are_unprocessable() {
    let matching: SpoError = MatchError::DanglingMatchTarget {
        lhs: NodeId(1),
        target: NodeId(9),
    }
    .into();
    let gluing: SpoError = RewriteError::InvalidGluingReference {
        role: GraphRole::Rhs,
        node: NodeId(4),
    }
    .into();

    assert_eq!(status_for(&matching), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(status_for(&gluing), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn test_server_side_errors_are_500() {
    assert_eq!(
        status_for(&SpoError::IoError("disk".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// =============================================================================
// VALIDATE RESPONSE TESTS
// =============================================================================

#[test]
fn test_valid_response_omits_error_fields() {
    let json = serde_json::to_value(ValidateResponse::valid()).unwrap();
    assert_eq!(json, serde_json::json!({"success": true, "valid": true}));
}

#[test]
fn test_invalid_response_carries_kind() {
    let err: SpoError = MatchError::NonInjectiveMatch {
        first: NodeId(1),
        second: NodeId(2),
        target: NodeId(5),
    }
    .into();
    let response = ValidateResponse::invalid(&err);

    assert!(response.success);
    assert!(!response.valid);
    assert_eq!(response.stage.as_deref(), Some("match"));
    assert_eq!(response.kind.as_deref(), Some("non_injective_match"));
}

#[test]
fn test_validate_response_roundtrip() {
    let json = r#"{"success":true,"valid":false,"stage":"match","kind":"incomplete_match","error":"x"}"#;
    let response: ValidateResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.kind.as_deref(), Some("incomplete_match"));
    assert_eq!(response.error.as_deref(), Some("x"));
}
