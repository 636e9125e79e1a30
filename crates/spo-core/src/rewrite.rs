//! # Rewrite Engine
//!
//! Single-pushout rewriting of an input graph G by a rule L ⇀ R.
//!
//! Given a validated match `m: L → G` and a gluing map `g: R ⇀ L`:
//!
//! 1. L nodes outside `image(g)` are deleted; their images leave G together
//!    with every incident edge (dangling edges are dropped, not rejected)
//! 2. R nodes with `g(r)` defined are preserved as `m(g(r))`; the others are
//!    new nodes with fresh ids above every id of G
//! 3. Output nodes: surviving G nodes plus new nodes
//! 4. Output edges: surviving G edges plus the image of every R edge
//!
//! The engine is all-or-nothing: preconditions are checked first, the
//! inputs are only borrowed, and a failed call produces no graph.

use crate::correspondence::Correspondence;
use crate::graph::Graph;
use crate::matching::{MatchValidator, ValidatedMatch};
use crate::primitives::{FIRST_NODE_ID, MAX_NODE_ID};
use crate::{GraphRole, NodeId, RewriteError, SpoError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// OPTIONS & OUTCOME
// =============================================================================

/// Tunable parts of the rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// Also drop a matched input edge when its LHS edge has no counterpart
    /// between the corresponding preserved RHS nodes.
    ///
    /// Off by default: only edges touching deleted nodes are removed.
    #[serde(default)]
    pub delete_unpreserved_edges: bool,
}

/// What a rewrite changed, for logging and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Input nodes removed, ascending.
    pub deleted_nodes: Vec<NodeId>,
    /// New nodes: RHS id -> output id.
    pub created_nodes: BTreeMap<NodeId, NodeId>,
    /// Input edges absent from the output.
    pub removed_edges: usize,
    /// Output edges absent from the input.
    pub added_edges: usize,
}

/// The output graph plus its report.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub graph: Graph,
    pub report: RewriteReport,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Computes single-pushout rewrites.
pub struct RewriteEngine;

impl RewriteEngine {
    /// Rewrite `input` with default options.
    pub fn apply(
        input: &Graph,
        lhs: &Graph,
        rhs: &Graph,
        matching: &ValidatedMatch,
        gluing: &Correspondence,
    ) -> Result<RewriteOutcome, RewriteError> {
        Self::apply_with(input, lhs, rhs, matching, gluing, RewriteOptions::default())
    }

    /// Rewrite `input` by the rule `lhs ⇀ rhs` at `matching`.
    pub fn apply_with(
        input: &Graph,
        lhs: &Graph,
        rhs: &Graph,
        matching: &ValidatedMatch,
        gluing: &Correspondence,
        options: RewriteOptions,
    ) -> Result<RewriteOutcome, RewriteError> {
        Self::validate_gluing(rhs, lhs, gluing)?;
        Self::check_match_is_current(input, lhs, matching)?;
        let first_fresh = Self::reserve_fresh_ids(input, rhs, gluing)?;

        let mut report = RewriteReport::default();

        // Step 1: classify L. Everything not glued onto is deleted.
        let preserved_lhs = gluing.image();
        let deleted_inputs: BTreeSet<NodeId> = lhs
            .node_ids()
            .filter(|l| !preserved_lhs.contains(l))
            .filter_map(|l| matching.image_of(l))
            .collect();
        report.deleted_nodes = deleted_inputs.iter().copied().collect();

        // Step 3 (first half) and step 4a: surviving part of G.
        let mut output = Graph::new();
        for node in input.nodes() {
            if !deleted_inputs.contains(&node.id) {
                output.insert_node_with_id(node.id, node.position);
            }
        }
        for (a, b) in input.edges() {
            if deleted_inputs.contains(&a) || deleted_inputs.contains(&b) {
                report.removed_edges = report.removed_edges.saturating_add(1);
            } else {
                output.insert_edge(a, b);
            }
        }

        if options.delete_unpreserved_edges {
            let removed = Self::remove_unpreserved_edges(&mut output, lhs, rhs, matching, gluing);
            report.removed_edges = report.removed_edges.saturating_add(removed);
        }

        // Step 2: classify R. Fresh ids start above the largest id of G and
        // were checked against MAX_NODE_ID up front.
        let fresh = rhs.node_ids().filter(|r| !gluing.contains_key(*r));
        for (id, r) in (first_fresh..).zip(fresh) {
            let id = NodeId(id);
            output.insert_node_with_id(id, rhs.position(r).unwrap_or_default());
            report.created_nodes.insert(r, id);
        }

        // Step 4b: image of every R edge.
        let out = |r: NodeId| -> Option<NodeId> {
            match gluing.get(r) {
                Some(l) => matching.image_of(l),
                None => report.created_nodes.get(&r).copied(),
            }
        };
        let mut added = 0usize;
        for (r1, r2) in rhs.edges() {
            let (Some(o1), Some(o2)) = (out(r1), out(r2)) else {
                continue;
            };
            if o1 != o2 && output.insert_edge(o1, o2) {
                added = added.saturating_add(1);
            }
        }
        report.added_edges = added;

        Ok(RewriteOutcome {
            graph: output,
            report,
        })
    }

    /// Check a gluing map `rhs ⇀ lhs`.
    ///
    /// The map may be partial, but must be injective and reference only
    /// existing nodes on both sides.
    pub fn validate_gluing(
        rhs: &Graph,
        lhs: &Graph,
        gluing: &Correspondence,
    ) -> Result<(), RewriteError> {
        if let Some((first, second, lhs_node)) = gluing.first_collision() {
            return Err(RewriteError::AmbiguousGluing {
                first,
                second,
                lhs: lhs_node,
            });
        }
        for (r, l) in gluing.iter() {
            if !rhs.contains_node(r) {
                return Err(RewriteError::InvalidGluingReference {
                    role: GraphRole::Rhs,
                    node: r,
                });
            }
            if !lhs.contains_node(l) {
                return Err(RewriteError::InvalidGluingReference {
                    role: GraphRole::Lhs,
                    node: l,
                });
            }
        }
        Ok(())
    }

    /// Graphs may be edited after validation; the match must still be a
    /// total, injective, structure-preserving map into the current input.
    fn check_match_is_current(
        input: &Graph,
        lhs: &Graph,
        matching: &ValidatedMatch,
    ) -> Result<(), RewriteError> {
        MatchValidator::validate(lhs, input, matching.correspondence())
            .map(|_| ())
            .map_err(|reason| RewriteError::StaleMatch { reason })
    }

    /// First fresh id, once every new node is known to fit below
    /// `MAX_NODE_ID`.
    fn reserve_fresh_ids(
        input: &Graph,
        rhs: &Graph,
        gluing: &Correspondence,
    ) -> Result<u64, RewriteError> {
        let needed = rhs.node_ids().filter(|r| !gluing.contains_key(*r)).count();
        let first = input
            .max_node_id()
            .map_or(FIRST_NODE_ID, |max| max.value().saturating_add(1));
        let last = u64::try_from(needed)
            .ok()
            .and_then(|n| first.checked_add(n))
            .map(|end| end.saturating_sub(1));
        match last {
            Some(last) if needed == 0 || last <= MAX_NODE_ID => Ok(first),
            _ => Err(RewriteError::IdSpaceExhausted {
                max_id: input.max_node_id().unwrap_or(NodeId(0)),
                needed,
            }),
        }
    }

    fn remove_unpreserved_edges(
        output: &mut Graph,
        lhs: &Graph,
        rhs: &Graph,
        matching: &ValidatedMatch,
        gluing: &Correspondence,
    ) -> usize {
        // Gluing is injective here, so the inverse is a function.
        let lhs_to_rhs: BTreeMap<NodeId, NodeId> = gluing.iter().map(|(r, l)| (l, r)).collect();

        let mut removed = 0usize;
        for (a, b) in lhs.edges() {
            let (Some(&ra), Some(&rb)) = (lhs_to_rhs.get(&a), lhs_to_rhs.get(&b)) else {
                continue;
            };
            if rhs.has_edge(ra, rb) {
                continue;
            }
            let (Some(ia), Some(ib)) = (matching.image_of(a), matching.image_of(b)) else {
                continue;
            };
            if output.remove_edge(ia, ib) {
                removed = removed.saturating_add(1);
            }
        }
        removed
    }
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// The five inputs of a rewrite, owned together.
///
/// Produced by the node-link importer or assembled by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteArtifacts {
    pub input: Graph,
    pub lhs: Graph,
    pub rhs: Graph,
    pub lhs_to_input: Correspondence,
    pub rhs_to_lhs: Correspondence,
}

impl RewriteArtifacts {
    /// Validate the match only.
    pub fn validate_match(&self) -> Result<ValidatedMatch, SpoError> {
        Ok(MatchValidator::validate(
            &self.lhs,
            &self.input,
            &self.lhs_to_input,
        )?)
    }

    /// Validate the match, then rewrite.
    pub fn run(&self, options: RewriteOptions) -> Result<RewriteOutcome, SpoError> {
        let matching = self.validate_match()?;
        Ok(RewriteEngine::apply_with(
            &self.input,
            &self.lhs,
            &self.rhs,
            &matching,
            &self.rhs_to_lhs,
            options,
        )?)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchError, Position};

    fn graph(nodes: &[u64], edges: &[(u64, u64)]) -> Graph {
        let mut g = Graph::new();
        for &id in nodes {
            g.insert_node_with_id(NodeId(id), Position::new(id as f64, 0.0));
        }
        for &(a, b) in edges {
            g.insert_edge(NodeId(a), NodeId(b));
        }
        g
    }

    fn map(pairs: &[(u64, u64)]) -> Correspondence {
        pairs.iter().map(|&(k, v)| (NodeId(k), NodeId(v))).collect()
    }

    fn validated(lhs: &Graph, input: &Graph, pairs: &[(u64, u64)]) -> ValidatedMatch {
        MatchValidator::validate(lhs, input, &map(pairs)).expect("valid match")
    }

    fn edge_list(g: &Graph) -> Vec<(u64, u64)> {
        g.edges().map(|(a, b)| (a.0, b.0)).collect()
    }

    fn node_list(g: &Graph) -> Vec<u64> {
        g.node_ids().map(NodeId::value).collect()
    }

    #[test]
    fn deleting_a_node_drops_its_edges() {
        // G: path 1-2-3, L: single node matched to 2, R: empty.
        let input = graph(&[1, 2, 3], &[(1, 2), (2, 3)]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[], &[]);
        let m = validated(&lhs, &input, &[(1, 2)]);

        let outcome = RewriteEngine::apply(&input, &lhs, &rhs, &m, &Correspondence::new())
            .expect("rewrite");

        assert_eq!(node_list(&outcome.graph), vec![1, 3]);
        assert!(edge_list(&outcome.graph).is_empty());
        assert_eq!(outcome.report.deleted_nodes, vec![NodeId(2)]);
        assert_eq!(outcome.report.removed_edges, 2);
    }

    #[test]
    fn new_nodes_get_ids_above_input_max() {
        let input = graph(&[3, 7], &[]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[1, 2, 3], &[(1, 2), (2, 3)]);
        let m = validated(&lhs, &input, &[(1, 7)]);

        let outcome =
            RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(1, 1)])).expect("rewrite");

        assert_eq!(node_list(&outcome.graph), vec![3, 7, 8, 9]);
        assert_eq!(edge_list(&outcome.graph), vec![(7, 8), (8, 9)]);
        assert_eq!(outcome.report.created_nodes.get(&NodeId(2)), Some(&NodeId(8)));
        assert_eq!(outcome.report.created_nodes.get(&NodeId(3)), Some(&NodeId(9)));
        assert_eq!(outcome.report.added_edges, 2);
        // New nodes keep their RHS position.
        assert_eq!(outcome.graph.position(NodeId(9)), Some(Position::new(3.0, 0.0)));
    }

    #[test]
    fn preserved_nodes_keep_id_and_position() {
        let input = graph(&[1, 2], &[(1, 2)]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[5], &[]);
        let m = validated(&lhs, &input, &[(1, 2)]);

        let outcome =
            RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(5, 1)])).expect("rewrite");

        assert_eq!(outcome.graph, input);
        assert_eq!(outcome.report, RewriteReport::default());
    }

    #[test]
    fn unpreserved_edges_survive_by_default() {
        // L and R both keep nodes 1 and 2, but R drops the edge between them.
        let input = graph(&[1, 2], &[(1, 2)]);
        let lhs = graph(&[1, 2], &[(1, 2)]);
        let rhs = graph(&[1, 2], &[]);
        let m = validated(&lhs, &input, &[(1, 1), (2, 2)]);
        let g = map(&[(1, 1), (2, 2)]);

        let kept = RewriteEngine::apply(&input, &lhs, &rhs, &m, &g).expect("rewrite");
        assert_eq!(edge_list(&kept.graph), vec![(1, 2)]);

        let options = RewriteOptions {
            delete_unpreserved_edges: true,
        };
        let dropped =
            RewriteEngine::apply_with(&input, &lhs, &rhs, &m, &g, options).expect("rewrite");
        assert!(edge_list(&dropped.graph).is_empty());
        assert_eq!(dropped.report.removed_edges, 1);
    }

    #[test]
    fn ambiguous_gluing_is_rejected() {
        let input = graph(&[1], &[]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[1, 2], &[]);
        let m = validated(&lhs, &input, &[(1, 1)]);

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(1, 1), (2, 1)]))
            .expect_err("ambiguous");
        assert_eq!(
            err,
            RewriteError::AmbiguousGluing {
                first: NodeId(1),
                second: NodeId(2),
                lhs: NodeId(1),
            }
        );
    }

    #[test]
    fn gluing_references_are_checked_on_both_sides() {
        let input = graph(&[1], &[]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[1], &[]);
        let m = validated(&lhs, &input, &[(1, 1)]);

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(4, 1)])).expect_err("rhs");
        assert_eq!(
            err,
            RewriteError::InvalidGluingReference {
                role: GraphRole::Rhs,
                node: NodeId(4),
            }
        );

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(1, 6)])).expect_err("lhs");
        assert_eq!(
            err,
            RewriteError::InvalidGluingReference {
                role: GraphRole::Lhs,
                node: NodeId(6),
            }
        );
    }

    #[test]
    fn match_made_stale_by_editing_is_rejected() {
        let mut input = graph(&[1, 2], &[]);
        let lhs = graph(&[1], &[]);
        let rhs = graph(&[1], &[]);
        let m = validated(&lhs, &input, &[(1, 2)]);

        input.remove_node(NodeId(2));

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(1, 1)])).expect_err("stale");
        assert_eq!(
            err,
            RewriteError::StaleMatch {
                reason: MatchError::DanglingMatchTarget {
                    lhs: NodeId(1),
                    target: NodeId(2),
                },
            }
        );
    }

    #[test]
    fn match_made_stale_by_removing_input_edge_is_rejected() {
        let mut input = graph(&[1, 2], &[(1, 2)]);
        let lhs = graph(&[1, 2], &[(1, 2)]);
        let rhs = Graph::new();
        let m = validated(&lhs, &input, &[(1, 1), (2, 2)]);

        input.toggle_edge(NodeId(1), NodeId(2));

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &Correspondence::new())
            .expect_err("stale");
        assert!(matches!(
            err,
            RewriteError::StaleMatch {
                reason: MatchError::StructureNotPreserved { .. }
            }
        ));
        assert_eq!(err.kind(), "stale_match");
    }

    #[test]
    fn match_made_stale_by_adding_lhs_edge_is_rejected() {
        let input = graph(&[1, 2], &[]);
        let mut lhs = graph(&[1, 2], &[]);
        let rhs = graph(&[1, 2], &[]);
        let m = validated(&lhs, &input, &[(1, 1), (2, 2)]);

        lhs.toggle_edge(NodeId(1), NodeId(2));

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &map(&[(1, 1), (2, 2)]))
            .expect_err("stale");
        assert!(matches!(err, RewriteError::StaleMatch { .. }));
    }

    #[test]
    fn fresh_ids_never_pass_max_node_id() {
        let mut input = Graph::new();
        input.insert_node_with_id(NodeId(MAX_NODE_ID), Position::new(0.0, 0.0));
        let lhs = Graph::new();
        let rhs = graph(&[1, 2], &[(1, 2)]);
        let m = validated(&lhs, &input, &[]);

        let err = RewriteEngine::apply(&input, &lhs, &rhs, &m, &Correspondence::new())
            .expect_err("no ids left");
        assert_eq!(
            err,
            RewriteError::IdSpaceExhausted {
                max_id: NodeId(MAX_NODE_ID),
                needed: 2,
            }
        );

        // Preserving every RHS node needs no fresh id.
        let rhs = Graph::new();
        let outcome =
            RewriteEngine::apply(&input, &lhs, &rhs, &m, &Correspondence::new()).expect("rewrite");
        assert_eq!(node_list(&outcome.graph), vec![MAX_NODE_ID]);
    }

    #[test]
    fn empty_input_allocates_from_one() {
        let input = Graph::new();
        let lhs = Graph::new();
        let rhs = graph(&[4], &[]);
        let m = validated(&lhs, &input, &[]);

        let outcome =
            RewriteEngine::apply(&input, &lhs, &rhs, &m, &Correspondence::new()).expect("rewrite");
        assert_eq!(node_list(&outcome.graph), vec![1]);
    }

    #[test]
    fn artifacts_run_reports_match_errors() {
        let artifacts = RewriteArtifacts {
            input: graph(&[1, 2], &[]),
            lhs: graph(&[1, 2], &[(1, 2)]),
            rhs: Graph::new(),
            lhs_to_input: map(&[(1, 1), (2, 2)]),
            rhs_to_lhs: Correspondence::new(),
        };

        let err = artifacts.run(RewriteOptions::default()).expect_err("no 1-2 edge");
        assert_eq!(err.stage(), "match");
        assert_eq!(err.kind(), "structure_not_preserved");
    }
}
