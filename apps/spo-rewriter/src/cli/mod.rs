//! # Rewriter CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server (default when no command is given)
//! - `rewrite` - Apply the rule in a request file
//! - `validate` - Check the match in a request file

mod commands;

use crate::config::ServerConfig;
use clap::{Parser, Subcommand};
use spo_core::SpoError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// SPO Graph Rewriter
///
/// Applies single-pushout graph rewriting rules to undirected graphs,
/// over HTTP or from request files.
#[derive(Parser, Debug)]
#[command(name = "spo-rewriter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config and SPO_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config and SPO_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply the rule in a request file
    Rewrite {
        /// Request file (same JSON as the /calculate body)
        #[arg(short, long)]
        request: PathBuf,

        /// Write the rewritten graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also delete matched LHS edges the RHS does not keep
        #[arg(long)]
        delete_unpreserved_edges: bool,
    },

    /// Check the match in a request file
    Validate {
        /// Request file (same JSON as the /calculate body)
        #[arg(short, long)]
        request: PathBuf,
    },
}

impl Cli {
    /// Whether stdout carries machine-readable output only.
    #[must_use]
    pub fn wants_plain_stdout(&self) -> bool {
        self.quiet
            || self.json_mode
            || matches!(self.command, Some(Commands::Rewrite { output: None, .. }))
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SpoError> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(config).await
        }
        Some(Commands::Rewrite {
            request,
            output,
            delete_unpreserved_edges,
        }) => cmd_rewrite(
            &request,
            output.as_deref(),
            delete_unpreserved_edges,
            json_mode,
        ),
        Some(Commands::Validate { request }) => cmd_validate(&request, json_mode),
        None => cmd_server(config).await,
    }
}
