//! # SPO Graph Rewriter
//!
//! The main binary for the single-pushout graph rewriter.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │             apps/spo-rewriter (THE BINARY)           │
//! │                                                      │
//! │   ┌─────────────┐    ┌─────────────┐    ┌────────┐   │
//! │   │   CLI       │    │   HTTP API  │    │ Config │   │
//! │   │  (clap)     │    │   (axum)    │    │ (toml) │   │
//! │   └──────┬──────┘    └──────┬──────┘    └────┬───┘   │
//! │          └──────────────────┼────────────────┘       │
//! │                             ▼                        │
//! │                     ┌───────────────┐                │
//! │                     │   spo-core    │                │
//! │                     │  (THE LOGIC)  │                │
//! │                     └───────────────┘                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! spo-rewriter server --host 0.0.0.0 --port 8080
//!
//! # Offline operations
//! spo-rewriter rewrite -r request.json -o output.json
//! spo-rewriter validate -r request.json
//! ```

use clap::Parser;
use spo_rewriter::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SPO_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SPO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spo_rewriter=info,tower_http=debug".into());

    // Logs go to stderr so `rewrite` can print the graph on stdout.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.wants_plain_stdout() {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(stage = e.stage(), kind = e.kind(), "Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ___ ___  ___
  / __| _ \/ _ \   Graph Rewriter v{}
  \__ \  _/ (_) |
  |___/_|  \___/   Single-pushout rewriting for undirected graphs
"#,
        env!("CARGO_PKG_VERSION")
    );
}
