//! # spo-core
//!
//! The deterministic rewrite core of the SPO graph rewriter - THE LOGIC.
//!
//! A rule is a pattern graph (LHS), a replacement graph (RHS), and a gluing
//! map from RHS nodes to the LHS nodes they preserve. Applying the rule to
//! an input graph at a match (LHS → input) yields the single-pushout
//! rewrite of the input.
//!
//! ## Pipeline
//!
//! ```text
//!  Graph (input, lhs, rhs)      CorrespondenceBuilder ──▶ Correspondence
//!          │                                                 │
//!          └────────────┬────────────────────────────────────┘
//!                       ▼
//!               MatchValidator ──▶ ValidatedMatch ──▶ RewriteEngine ──▶ Graph
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no I/O: the app layer owns transport and files
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, output ordered by id
//! - All-or-nothing: a failed rewrite returns an error and no graph

// =============================================================================
// MODULES
// =============================================================================

pub mod correspondence;
pub mod formats;
pub mod graph;
pub mod matching;
pub mod primitives;
pub mod rewrite;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BuilderError, FormatError, GraphRole, MatchError, Node, NodeId, Position, RewriteError,
    SpoError,
};

// =============================================================================
// RE-EXPORTS: Rewrite Engine
// =============================================================================

pub use correspondence::{BuilderState, Correspondence, CorrespondenceBuilder, Snapshot};
pub use graph::Graph;
pub use matching::{MatchValidator, ValidatedMatch};
pub use rewrite::{
    RewriteArtifacts, RewriteEngine, RewriteOptions, RewriteOutcome, RewriteReport,
};
pub use session::RuleSession;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{NodeLinkGraph, RawNodeId, RewriteRequest, correspondence_to_json};
