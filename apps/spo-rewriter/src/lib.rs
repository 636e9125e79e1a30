//! # spo-rewriter
//!
//! HTTP service and CLI around `spo-core`.
//!
//! - `api`: axum router for `/calculate`, `/validate` and `/health`
//! - `cli`: clap commands (`server`, `rewrite`, `validate`)
//! - `config`: layered `ServerConfig` (TOML file, `SPO_*` environment)

pub mod api;
pub mod cli;
pub mod config;
