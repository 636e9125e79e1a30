//! # Match Validation
//!
//! Checks that a proposed LHS → input map is a graph morphism the rewrite
//! engine can use: total, injective, landing on input nodes, and carrying
//! every LHS edge onto an input edge.
//!
//! The only way to obtain a `ValidatedMatch` is through
//! `MatchValidator::validate`, so the engine can never run on an unchecked
//! map.

use crate::correspondence::Correspondence;
use crate::graph::Graph;
use crate::{MatchError, NodeId};

// =============================================================================
// VALIDATED MATCH
// =============================================================================

/// A match that passed every check against a specific LHS and input graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMatch {
    map: Correspondence,
}

impl ValidatedMatch {
    /// Input node matched by the LHS node `lhs`.
    #[must_use]
    pub fn image_of(&self, lhs: NodeId) -> Option<NodeId> {
        self.map.get(lhs)
    }

    /// The underlying correspondence.
    #[must_use]
    pub fn correspondence(&self) -> &Correspondence {
        &self.map
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Validates LHS → input maps.
pub struct MatchValidator;

impl MatchValidator {
    /// Validate `map` as a match of `lhs` into `input`.
    ///
    /// Checks run in order and stop at the first failure:
    /// 1. every LHS node is mapped, and every key is an LHS node
    /// 2. no two LHS nodes share an image
    /// 3. every image is an input node
    /// 4. every LHS edge lands on an input edge
    pub fn validate(
        lhs: &Graph,
        input: &Graph,
        map: &Correspondence,
    ) -> Result<ValidatedMatch, MatchError> {
        Self::check_total(lhs, map)?;
        Self::check_injective(map)?;
        Self::check_targets(input, map)?;
        Self::check_structure(lhs, input, map)?;

        Ok(ValidatedMatch { map: map.clone() })
    }

    fn check_total(lhs: &Graph, map: &Correspondence) -> Result<(), MatchError> {
        if let Some(missing) = lhs.node_ids().find(|id| !map.contains_key(*id)) {
            return Err(MatchError::IncompleteMatch { missing });
        }
        if let Some(node) = map.keys().find(|id| !lhs.contains_node(*id)) {
            return Err(MatchError::UnknownPatternNode { node });
        }
        Ok(())
    }

    // The builder already guarantees this; maps from requests do not.
    fn check_injective(map: &Correspondence) -> Result<(), MatchError> {
        match map.first_collision() {
            Some((first, second, target)) => Err(MatchError::NonInjectiveMatch {
                first,
                second,
                target,
            }),
            None => Ok(()),
        }
    }

    fn check_targets(input: &Graph, map: &Correspondence) -> Result<(), MatchError> {
        match map.iter().find(|(_, target)| !input.contains_node(*target)) {
            Some((lhs, target)) => Err(MatchError::DanglingMatchTarget { lhs, target }),
            None => Ok(()),
        }
    }

    fn check_structure(lhs: &Graph, input: &Graph, map: &Correspondence) -> Result<(), MatchError> {
        for (a, b) in lhs.edges() {
            // Totality was checked first, so both images exist.
            let (Some(ia), Some(ib)) = (map.get(a), map.get(b)) else {
                continue;
            };
            if !input.has_edge(ia, ib) {
                return Err(MatchError::StructureNotPreserved {
                    lhs_edge: (a, b),
                    image: (ia, ib),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Input: path 1-2-3. LHS: single edge 1-2.
    fn fixture() -> (Graph, Graph) {
        let mut input = Graph::new();
        let n1 = input.add_node(0.0, 0.0).expect("fresh id");
        let n2 = input.add_node(1.0, 0.0).expect("fresh id");
        let n3 = input.add_node(2.0, 0.0).expect("fresh id");
        input.toggle_edge(n1, n2);
        input.toggle_edge(n2, n3);

        let mut lhs = Graph::new();
        let a = lhs.add_node(0.0, 0.0).expect("fresh id");
        let b = lhs.add_node(1.0, 0.0).expect("fresh id");
        lhs.toggle_edge(a, b);

        (input, lhs)
    }

    fn map(pairs: &[(u64, u64)]) -> Correspondence {
        pairs.iter().map(|&(k, v)| (NodeId(k), NodeId(v))).collect()
    }

    #[test]
    fn valid_match_is_accepted() {
        let (input, lhs) = fixture();
        let validated = MatchValidator::validate(&lhs, &input, &map(&[(1, 2), (2, 3)]))
            .expect("valid match");

        assert_eq!(validated.image_of(NodeId(1)), Some(NodeId(2)));
        assert_eq!(validated.image_of(NodeId(2)), Some(NodeId(3)));
    }

    #[test]
    fn reversed_edge_orientation_is_accepted() {
        let (input, lhs) = fixture();
        assert!(MatchValidator::validate(&lhs, &input, &map(&[(1, 2), (2, 1)])).is_ok());
    }

    #[test]
    fn missing_lhs_node_is_incomplete() {
        let (input, lhs) = fixture();
        let err = MatchValidator::validate(&lhs, &input, &map(&[(1, 1)])).expect_err("partial");
        assert_eq!(err, MatchError::IncompleteMatch { missing: NodeId(2) });
    }

    #[test]
    fn extra_key_is_unknown_pattern_node() {
        let (input, lhs) = fixture();
        let err = MatchValidator::validate(&lhs, &input, &map(&[(1, 1), (2, 2), (9, 3)]))
            .expect_err("extra key");
        assert_eq!(err, MatchError::UnknownPatternNode { node: NodeId(9) });
    }

    #[test]
    fn shared_image_is_non_injective() {
        let (input, lhs) = fixture();
        let err =
            MatchValidator::validate(&lhs, &input, &map(&[(1, 2), (2, 2)])).expect_err("shared");
        assert_eq!(
            err,
            MatchError::NonInjectiveMatch {
                first: NodeId(1),
                second: NodeId(2),
                target: NodeId(2),
            }
        );
    }

    #[test]
    fn image_outside_input_is_dangling() {
        let (input, lhs) = fixture();
        let err =
            MatchValidator::validate(&lhs, &input, &map(&[(1, 1), (2, 40)])).expect_err("dangling");
        assert_eq!(
            err,
            MatchError::DanglingMatchTarget {
                lhs: NodeId(2),
                target: NodeId(40),
            }
        );
    }

    #[test]
    fn edge_without_counterpart_is_not_preserved() {
        let (input, lhs) = fixture();
        let err = MatchValidator::validate(&lhs, &input, &map(&[(1, 1), (2, 3)]))
            .expect_err("1-3 is not an input edge");
        assert_eq!(
            err,
            MatchError::StructureNotPreserved {
                lhs_edge: (NodeId(1), NodeId(2)),
                image: (NodeId(1), NodeId(3)),
            }
        );
    }

    #[test]
    fn totality_is_checked_before_injectivity() {
        let (input, mut lhs) = fixture();
        lhs.add_node(0.0, 0.0).expect("fresh id");
        let err = MatchValidator::validate(&lhs, &input, &map(&[(1, 2), (2, 2)]))
            .expect_err("both incomplete and non-injective");
        assert_eq!(err, MatchError::IncompleteMatch { missing: NodeId(3) });
    }

    #[test]
    fn empty_pattern_matches_anything() {
        let (input, _) = fixture();
        let lhs = Graph::new();
        assert!(MatchValidator::validate(&lhs, &input, &Correspondence::new()).is_ok());
    }
}
