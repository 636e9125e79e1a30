//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the rewrite core:
//! - Node identifiers and layout positions (`NodeId`, `Position`, `Node`)
//! - The role a graph plays in a rule (`GraphRole`)
//! - The error taxonomy (`BuilderError`, `MatchError`, `RewriteError`,
//!   `FormatError`, and the umbrella `SpoError`)
//!
//! ## Determinism Guarantees
//!
//! - Identifiers implement `Ord` so every container can be a `BTreeMap`/`BTreeSet`
//! - Positions are carried through untouched; nothing in the core computes on them
//! - Every error is a recoverable value. The core never panics on bad input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a node, unique within one graph.
///
/// Identifiers are positive; `0` is never allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D layout position of a node.
///
/// Used only for presentation; never part of graph semantics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node: identifier plus position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
}

impl Node {
    #[must_use]
    pub const fn new(id: NodeId, position: Position) -> Self {
        Self { id, position }
    }
}

// =============================================================================
// GRAPH ROLE
// =============================================================================

/// Which of the three rule graphs a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphRole {
    /// The graph being rewritten.
    Input,
    /// The left-hand (pattern) graph.
    Lhs,
    /// The right-hand (replacement) graph.
    Rhs,
}

impl fmt::Display for GraphRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Lhs => "lhs",
            Self::Rhs => "rhs",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by `CorrespondenceBuilder::assign`.
///
/// All of them reject a single assignment; the session stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Every domain element already has an assignment.
    #[error("domain exhausted: all {domain_len} domain elements are assigned")]
    DomainExhausted { domain_len: usize },

    /// The codomain id is already the image of another domain element.
    #[error("target {target} is already assigned to {assigned_to}")]
    DuplicateTarget { target: NodeId, assigned_to: NodeId },

    /// No session is in progress (idle or cancelled).
    #[error("no correspondence is being built")]
    NotBuilding,
}

impl BuilderError {
    /// Stable snake_case identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DomainExhausted { .. } => "domain_exhausted",
            Self::DuplicateTarget { .. } => "duplicate_target",
            Self::NotBuilding => "not_building",
        }
    }
}

/// Errors raised by `MatchValidator::validate`, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// An LHS node has no image.
    #[error("match is incomplete: lhs node {missing} is not mapped")]
    IncompleteMatch { missing: NodeId },

    /// The match has a key that is not an LHS node.
    #[error("match references lhs node {node} which does not exist")]
    UnknownPatternNode { node: NodeId },

    /// Two LHS nodes share an image.
    #[error("match is not injective: lhs nodes {first} and {second} both map to {target}")]
    NonInjectiveMatch {
        first: NodeId,
        second: NodeId,
        target: NodeId,
    },

    /// An image is not a node of the input graph.
    #[error("lhs node {lhs} maps to {target} which is not an input node")]
    DanglingMatchTarget { lhs: NodeId, target: NodeId },

    /// An LHS edge has no input edge between its images.
    #[error("lhs edge {}-{} maps to {}-{} which is not an input edge", .lhs_edge.0, .lhs_edge.1, .image.0, .image.1)]
    StructureNotPreserved {
        lhs_edge: (NodeId, NodeId),
        image: (NodeId, NodeId),
    },
}

impl MatchError {
    /// Stable snake_case identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IncompleteMatch { .. } => "incomplete_match",
            Self::UnknownPatternNode { .. } => "unknown_pattern_node",
            Self::NonInjectiveMatch { .. } => "non_injective_match",
            Self::DanglingMatchTarget { .. } => "dangling_match_target",
            Self::StructureNotPreserved { .. } => "structure_not_preserved",
        }
    }
}

/// Errors raised by `RewriteEngine::apply` before any work is done.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two RHS nodes are glued onto the same LHS node.
    #[error("gluing is ambiguous: rhs nodes {first} and {second} both map to lhs node {lhs}")]
    AmbiguousGluing {
        first: NodeId,
        second: NodeId,
        lhs: NodeId,
    },

    /// The gluing map mentions a node missing from its graph.
    #[error("gluing references {role} node {node} which does not exist")]
    InvalidGluingReference { role: GraphRole, node: NodeId },

    /// The validated match no longer fits the graphs it is applied to.
    #[error("match is stale: {reason}")]
    StaleMatch { reason: MatchError },

    /// Fresh ids for the new nodes would pass `MAX_NODE_ID`.
    #[error("no fresh ids left: {needed} new nodes after id {max_id}")]
    IdSpaceExhausted { max_id: NodeId, needed: usize },
}

impl RewriteError {
    /// Stable snake_case identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AmbiguousGluing { .. } => "ambiguous_gluing",
            Self::InvalidGluingReference { .. } => "invalid_gluing_reference",
            Self::StaleMatch { .. } => "stale_match",
            Self::IdSpaceExhausted { .. } => "id_space_exhausted",
        }
    }
}

/// Errors raised while converting node-link data into core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// An id is neither a positive integer nor a numeric string.
    #[error("invalid node id '{raw}' in {context}")]
    InvalidNodeId { raw: String, context: String },

    /// The same node id appears twice in one graph.
    #[error("duplicate node {node} in {role} graph")]
    DuplicateNode { role: GraphRole, node: NodeId },

    /// A link refers to a node the graph does not declare.
    #[error("link {}-{} in {role} graph references unknown node {missing}", .link.0, .link.1)]
    UnknownEndpoint {
        role: GraphRole,
        link: (NodeId, NodeId),
        missing: NodeId,
    },

    /// Two mapping keys name the same node once normalised.
    #[error("mapping {mapping} lists node {node} more than once")]
    DuplicateMappingKey { mapping: String, node: NodeId },

    /// A link connects a node to itself.
    #[error("self-loop on node {node} in {role} graph")]
    SelfLoop { role: GraphRole, node: NodeId },

    /// Directed graphs are not supported.
    #[error("{role} graph is directed; only undirected graphs are supported")]
    DirectedGraph { role: GraphRole },

    /// Multigraphs are not supported.
    #[error("{role} graph is a multigraph; only simple graphs are supported")]
    Multigraph { role: GraphRole },

    /// A graph or mapping exceeds the configured limits.
    #[error("{what} has {count} entries, maximum is {max}")]
    TooLarge {
        what: String,
        count: usize,
        max: usize,
    },
}

impl FormatError {
    /// Stable snake_case identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidNodeId { .. } => "invalid_node_id",
            Self::DuplicateNode { .. } => "duplicate_node",
            Self::DuplicateMappingKey { .. } => "duplicate_mapping_key",
            Self::UnknownEndpoint { .. } => "unknown_endpoint",
            Self::SelfLoop { .. } => "self_loop",
            Self::DirectedGraph { .. } => "directed_graph",
            Self::Multigraph { .. } => "multigraph",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

/// Umbrella error for callers that drive the whole pipeline.
///
/// - No silent failures
/// - Every variant is recoverable
#[derive(Debug, Error)]
pub enum SpoError {
    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SpoError {
    /// Which pipeline stage produced the error.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Builder(_) => "correspondence",
            Self::Match(_) | Self::Rewrite(RewriteError::StaleMatch { .. }) => "match",
            Self::Rewrite(_) => "gluing",
            Self::Format(_) | Self::SerializationError(_) => "request",
            Self::ConfigError(_) => "config",
            Self::IoError(_) => "io",
        }
    }

    /// Stable snake_case identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Builder(e) => e.kind(),
            Self::Match(e) => e.kind(),
            Self::Rewrite(e) => e.kind(),
            Self::Format(e) => e.kind(),
            Self::SerializationError(_) => "serialization",
            Self::ConfigError(_) => "config",
            Self::IoError(_) => "io",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
