//! # Rewriter HTTP API Module
//!
//! HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `POST /calculate` - Apply a rule, return the rewritten graph
//! - `POST /validate` - Check the match of a rule only
//! - `GET /health` - Health check
//!
//! ## Security Configuration
//!
//! Taken from `ServerConfig` (file or `SPO_*` environment variables):
//!
//! - `cors_origins`: allowed origins, or "*" for all (default: localhost only)
//! - `rate_limit`: requests per second (default: 100, 0 to disable)
//! - `max_body_bytes`: request body cap (default: 2 MiB)

mod handlers;
mod middleware;
mod types;

pub use handlers::{calculate_handler, health_handler, validate_handler};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{ErrorResponse, HealthResponse, ValidateResponse, status_for};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use spo_core::SpoError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer.
///
/// - `["*"]`: allows all origins, as graph editors are often served from
///   arbitrary hosts during development
/// - empty: localhost only
/// - otherwise: exactly the listed origins
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allows_any_origin() {
        tracing::warn!("CORS: Allowing ALL origins (cors_origins = \"*\"). Do not expose publicly!");
        return CorsLayer::permissive();
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }
    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/calculate", post(handlers::calculate_handler))
        .route("/validate", post(handlers::validate_handler));

    if config.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(config.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind and serve until the process is stopped.
pub async fn run_server(config: &ServerConfig) -> Result<(), SpoError> {
    let router = create_router(config);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SpoError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("SPO rewriter listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| SpoError::IoError(format!("Server error: {}", e)))
}
