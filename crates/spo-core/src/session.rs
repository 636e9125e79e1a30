//! # Rule Session
//!
//! Owns the three graphs of a rule and the two correspondence builders,
//! and drives the editing flow an interactive front end follows:
//!
//! 1. edit the input, LHS and RHS graphs
//! 2. `begin_match` and click input nodes (`assign_match`) in LHS order
//! 3. `begin_gluing` and click LHS nodes (`assign_gluing`) in RHS order,
//!    stopping early to leave the remaining RHS nodes new
//! 4. `rewrite`
//!
//! Domain policy: both builders walk their domain in ascending node id.
//! The correspondences hold ids only, so editing a graph after building a
//! map is allowed; the stale map is caught by validation.

use crate::correspondence::{BuilderState, Correspondence, CorrespondenceBuilder};
use crate::graph::Graph;
use crate::matching::{MatchValidator, ValidatedMatch};
use crate::rewrite::{RewriteEngine, RewriteOptions, RewriteOutcome};
use crate::{GraphRole, MatchError, NodeId, RewriteError, SpoError};

/// A rule under construction together with the graph it will rewrite.
#[derive(Debug, Clone, Default)]
pub struct RuleSession {
    input: Graph,
    lhs: Graph,
    rhs: Graph,
    match_builder: CorrespondenceBuilder,
    gluing_builder: CorrespondenceBuilder,
}

impl RuleSession {
    /// Create a session with empty graphs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session over existing graphs.
    #[must_use]
    pub fn with_graphs(input: Graph, lhs: Graph, rhs: Graph) -> Self {
        Self {
            input,
            lhs,
            rhs,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Graphs
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn graph(&self, role: GraphRole) -> &Graph {
        match role {
            GraphRole::Input => &self.input,
            GraphRole::Lhs => &self.lhs,
            GraphRole::Rhs => &self.rhs,
        }
    }

    /// Mutable access for editing. Existing maps are not adjusted.
    pub fn graph_mut(&mut self, role: GraphRole) -> &mut Graph {
        match role {
            GraphRole::Input => &mut self.input,
            GraphRole::Lhs => &mut self.lhs,
            GraphRole::Rhs => &mut self.rhs,
        }
    }

    // -------------------------------------------------------------------------
    // Match (LHS -> input)
    // -------------------------------------------------------------------------

    /// Start building the match over every LHS node, ascending.
    pub fn begin_match(&mut self) {
        self.match_builder.start(self.lhs.node_ids());
    }

    /// Map the pending LHS node onto `target`.
    ///
    /// Targets that are not input nodes are refused before reaching the
    /// builder, so the cursor does not move.
    pub fn assign_match(&mut self, target: NodeId) -> Result<(), SpoError> {
        if let Some(lhs) = self.match_builder.current_domain_element() {
            if !self.input.contains_node(target) {
                return Err(MatchError::DanglingMatchTarget { lhs, target }.into());
            }
        }
        Ok(self.match_builder.assign(target)?)
    }

    pub fn cancel_match(&mut self) {
        self.match_builder.cancel();
    }

    #[must_use]
    pub fn match_builder(&self) -> &CorrespondenceBuilder {
        &self.match_builder
    }

    /// The match as it stands: live assignments while building, otherwise
    /// the last completed map.
    #[must_use]
    pub fn match_map(&self) -> Correspondence {
        current_map(&self.match_builder)
    }

    /// Validate the current match against the current graphs.
    pub fn validate_match(&self) -> Result<ValidatedMatch, MatchError> {
        MatchValidator::validate(&self.lhs, &self.input, &self.match_map())
    }

    // -------------------------------------------------------------------------
    // Gluing (RHS -> LHS)
    // -------------------------------------------------------------------------

    /// Start building the gluing over every RHS node, ascending.
    pub fn begin_gluing(&mut self) {
        self.gluing_builder.start(self.rhs.node_ids());
    }

    /// Start building the gluing over a chosen subset of RHS nodes.
    ///
    /// RHS nodes left out will be created as new nodes.
    pub fn begin_gluing_over(&mut self, rhs_nodes: impl IntoIterator<Item = NodeId>) {
        let mut domain: Vec<NodeId> = rhs_nodes.into_iter().collect();
        domain.sort_unstable();
        self.gluing_builder.start(domain);
    }

    /// Glue the pending RHS node onto the LHS node `target`.
    pub fn assign_gluing(&mut self, target: NodeId) -> Result<(), SpoError> {
        if self.gluing_builder.current_domain_element().is_some() && !self.lhs.contains_node(target)
        {
            return Err(RewriteError::InvalidGluingReference {
                role: GraphRole::Lhs,
                node: target,
            }
            .into());
        }
        Ok(self.gluing_builder.assign(target)?)
    }

    pub fn cancel_gluing(&mut self) {
        self.gluing_builder.cancel();
    }

    #[must_use]
    pub fn gluing_builder(&self) -> &CorrespondenceBuilder {
        &self.gluing_builder
    }

    /// The gluing as it stands. Partial while building is a valid gluing.
    #[must_use]
    pub fn gluing_map(&self) -> Correspondence {
        current_map(&self.gluing_builder)
    }

    // -------------------------------------------------------------------------
    // Rewrite
    // -------------------------------------------------------------------------

    /// Validate the match and rewrite the input graph.
    ///
    /// The session itself is left unchanged.
    pub fn rewrite(&self, options: RewriteOptions) -> Result<RewriteOutcome, SpoError> {
        let matching = self.validate_match()?;
        Ok(RewriteEngine::apply_with(
            &self.input,
            &self.lhs,
            &self.rhs,
            &matching,
            &self.gluing_map(),
            options,
        )?)
    }
}

fn current_map(builder: &CorrespondenceBuilder) -> Correspondence {
    match builder.state() {
        BuilderState::Building => builder.snapshot().assignments,
        _ => builder.completed().cloned().unwrap_or_default(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
