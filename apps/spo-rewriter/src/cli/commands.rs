//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::ServerConfig;
use spo_core::{RewriteOutcome, RewriteRequest, SpoError, correspondence_to_json};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum request file size (64 MB).
///
/// Far above what the graph size limits allow, so only corrupt or hostile
/// files hit it.
const MAX_REQUEST_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), SpoError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| SpoError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(SpoError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, SpoError> {
    let canonical = path.canonicalize().map_err(|e| {
        SpoError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SpoError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path whose parent directory must already exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, SpoError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        SpoError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(SpoError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| SpoError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// REQUEST FILES
// =============================================================================

/// Read a rewrite request (the `/calculate` body) from a JSON file.
pub fn load_request(path: &Path) -> Result<RewriteRequest, SpoError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_REQUEST_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| SpoError::IoError(format!("Read file: {}", e)))?;

    serde_json::from_slice(&contents)
        .map_err(|e| SpoError::SerializationError(format!("Invalid request file: {}", e)))
}

/// Load a request file and apply its rule.
///
/// `strict` turns on deletion of LHS edges the RHS drops, on top of
/// whatever the request itself asks for.
pub fn rewrite_file(path: &Path, strict: bool) -> Result<RewriteOutcome, SpoError> {
    let request = load_request(path)?;
    run_request(&request, path, strict)
}

fn run_request(
    request: &RewriteRequest,
    path: &Path,
    strict: bool,
) -> Result<RewriteOutcome, SpoError> {
    let mut options = request.options();
    options.delete_unpreserved_edges |= strict;

    let artifacts = request.to_artifacts()?;
    tracing::info!(
        input_nodes = artifacts.input.node_count(),
        lhs_nodes = artifacts.lhs.node_count(),
        rhs_nodes = artifacts.rhs.node_count(),
        lhs_to_input = artifacts.lhs_to_input.len(),
        rhs_to_lhs = artifacts.rhs_to_lhs.len(),
        "Loaded rewrite request from {:?}",
        path
    );
    artifacts.run(options)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: ServerConfig) -> Result<(), SpoError> {
    println!("SPO Graph Rewriter Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.host);
    println!("  Port:       {}", config.port);
    println!("  Rate limit: {} req/s", config.rate_limit);
    println!("  Body limit: {} bytes", config.max_body_bytes);
    println!();
    println!("Endpoints:");
    println!("  POST /calculate - Apply a rewrite rule");
    println!("  POST /validate  - Check a match");
    println!("  GET  /health    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config).await
}

// =============================================================================
// REWRITE COMMAND
// =============================================================================

/// Apply the rule in a request file.
///
/// The rewritten graph goes to `output`, or to stdout when no output is
/// given.
pub fn cmd_rewrite(
    request: &Path,
    output: Option<&Path>,
    strict: bool,
    json_mode: bool,
) -> Result<(), SpoError> {
    let loaded = load_request(request)?;
    let outcome = run_request(&loaded, request, strict)?;
    let graph_json = serde_json::to_string_pretty(&loaded.output_graph(&outcome.graph))
        .map_err(|e| SpoError::SerializationError(e.to_string()))?;

    let Some(output) = output else {
        println!("{}", graph_json);
        return Ok(());
    };

    let validated_output = validate_output_path(output)?;
    std::fs::write(&validated_output, graph_json)
        .map_err(|e| SpoError::IoError(format!("Write file: {}", e)))?;

    let report = &outcome.report;
    if json_mode {
        let summary = serde_json::json!({
            "output": validated_output.to_string_lossy(),
            "node_count": outcome.graph.node_count(),
            "edge_count": outcome.graph.edge_count(),
            "report": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Rewrite applied");
    println!("===============");
    println!("Output:        {:?}", validated_output);
    println!("Nodes:         {}", outcome.graph.node_count());
    println!("Edges:         {}", outcome.graph.edge_count());
    println!("Deleted nodes: {}", report.deleted_nodes.len());
    println!("Created nodes: {}", report.created_nodes.len());
    println!("Removed edges: {}", report.removed_edges);
    println!("Added edges:   {}", report.added_edges);

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Check the match in a request file. An invalid match is an error.
pub fn cmd_validate(request: &Path, json_mode: bool) -> Result<(), SpoError> {
    let artifacts = load_request(request)?.to_artifacts()?;
    let result = artifacts.validate_match();

    if json_mode {
        let output = match &result {
            Ok(matching) => serde_json::json!({
                "valid": true,
                "match": correspondence_to_json(matching.correspondence()),
            }),
            Err(e) => serde_json::json!({
                "valid": false,
                "stage": e.stage(),
                "kind": e.kind(),
                "error": e.to_string(),
            }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else if result.is_ok() {
        println!(
            "Match is valid ({} LHS nodes onto {} input nodes)",
            artifacts.lhs.node_count(),
            artifacts.input.node_count()
        );
    }

    result.map(|_| ())
}
