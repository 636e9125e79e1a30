//! # API Endpoint Handlers
//!
//! Every handler is stateless: each request carries its three graphs and
//! two mappings and owns them for its lifetime.

use super::types::{ErrorResponse, HealthResponse, ValidateResponse, status_for};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use spo_core::{RewriteArtifacts, RewriteReport, RewriteRequest, SpoError};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CALCULATE HANDLER
// =============================================================================

/// Apply the rule in the request and return the rewritten graph.
pub async fn calculate_handler(
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Response {
    let request = match decode(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    log_request_summary("calculate", &request);

    let outcome = request
        .to_artifacts()
        .map_err(SpoError::from)
        .and_then(|artifacts| artifacts.run(request.options()));

    match outcome {
        Ok(outcome) => {
            log_report(&outcome.report);
            tracing::info!(
                nodes = outcome.graph.node_count(),
                edges = outcome.graph.edge_count(),
                "Rewrite applied"
            );
            (
                StatusCode::OK,
                Json(request.output_graph(&outcome.graph)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// VALIDATE HANDLER
// =============================================================================

/// Check the match of a request without rewriting.
///
/// A malformed request is a 400; a well-formed request whose match is not a
/// graph morphism is a 200 with `valid: false`.
pub async fn validate_handler(payload: Result<Json<RewriteRequest>, JsonRejection>) -> Response {
    let request = match decode(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    log_request_summary("validate", &request);

    let artifacts: RewriteArtifacts = match request.to_artifacts() {
        Ok(artifacts) => artifacts,
        Err(e) => return error_response(&e.into()),
    };

    let response = match artifacts.validate_match() {
        Ok(_) => ValidateResponse::valid(),
        Err(e) => {
            tracing::info!(kind = e.kind(), "Match rejected: {}", e);
            ValidateResponse::invalid(&e)
        }
    };
    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// HELPERS
// =============================================================================

fn decode(
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<RewriteRequest, Response> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            Err((
                status,
                Json(ErrorResponse::invalid_body(rejection.body_text())),
            )
                .into_response())
        }
    }
}

fn error_response(err: &SpoError) -> Response {
    let status = status_for(err);
    tracing::warn!(stage = err.stage(), kind = err.kind(), "Rewrite failed: {}", err);
    (status, Json(ErrorResponse::from_error(err))).into_response()
}

fn log_request_summary(endpoint: &str, request: &RewriteRequest) {
    tracing::info!(
        endpoint,
        input_nodes = request.input.nodes.len(),
        input_links = request.input.links.len(),
        lhs_nodes = request.lhs.nodes.len(),
        lhs_links = request.lhs.links.len(),
        rhs_nodes = request.rhs.nodes.len(),
        rhs_links = request.rhs.links.len(),
        lhs_to_input = request.lhs_to_input.len(),
        rhs_to_lhs = request.rhs_to_lhs.len(),
        "Received rewrite request"
    );
    tracing::debug!(
        lhs_to_input = ?request.lhs_to_input,
        rhs_to_lhs = ?request.rhs_to_lhs,
        "Request mappings"
    );
}

fn log_report(report: &RewriteReport) {
    tracing::info!(
        deleted_nodes = report.deleted_nodes.len(),
        created_nodes = report.created_nodes.len(),
        removed_edges = report.removed_edges,
        added_edges = report.added_edges,
        "Rewrite report"
    );
    tracing::debug!(
        deleted = ?report.deleted_nodes,
        created = ?report.created_nodes,
        "Rewrite node changes"
    );
}
