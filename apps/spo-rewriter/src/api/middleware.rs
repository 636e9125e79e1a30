//! # Middleware Module
//!
//! One quota shared by `/calculate`, `/validate` and `/health`. A rewrite
//! holds the whole request in memory, so the quota is what bounds
//! concurrent work; `ServerConfig::rate_limit` (`SPO_RATE_LIMIT`) sets it and
//! `0` leaves the layer out of the router.
//!
//! Refused requests get the same JSON error body as a failed rewrite, with
//! stage `request` and kind `rate_limited`.

use super::types::ErrorResponse;
use crate::config::DEFAULT_RATE_LIMIT;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

const DEFAULT_RPS: NonZeroU32 = match NonZeroU32::new(DEFAULT_RATE_LIMIT) {
    Some(rps) => rps,
    None => NonZeroU32::MIN,
};

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Process-wide limiter shared by every route.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Quota of `requests_per_second`, bursting up to the same number.
///
/// `0` maps to `DEFAULT_RATE_LIMIT`; `create_router` never calls this with
/// `0`.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// 429 with an `ErrorResponse` body once the quota is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }
    tracing::warn!(
        method = %request.method(),
        path = request.uri().path(),
        "Rate limit exceeded, request refused"
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::rate_limited()),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================
