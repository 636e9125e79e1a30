//! # Correspondences
//!
//! Partial node maps between two graphs, and the state machine that builds
//! them one assignment at a time.
//!
//! The same builder produces both the match (LHS → input) and the gluing
//! map (RHS → LHS). The order in which domain elements are offered is a
//! caller policy; the builder only enforces it.
//!
//! ## Builder States
//!
//! ```text
//!            start                 last assign
//!   Idle ───────────▶ Building ───────────────▶ Complete
//!                        │                          │
//!                 cancel │          start           │
//!                        ▼     ◀────────────────────┘
//!                    Cancelled ──────start──────▶ Building
//! ```

use crate::{BuilderError, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// CORRESPONDENCE
// =============================================================================

/// An immutable map from domain node ids to codomain node ids.
///
/// Holds ids only, never references, so it stays meaningful when the graphs
/// it was built against change. Whether it still fits them is checked by
/// the validators, not guaranteed by construction.
///
/// A correspondence frozen by `CorrespondenceBuilder` is injective. One built
/// with `from_pairs` (e.g. from a request) may not be.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Correspondence {
    pairs: BTreeMap<NodeId, NodeId>,
}

impl Correspondence {
    /// Create an empty correspondence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a correspondence from arbitrary pairs.
    ///
    /// A repeated key keeps its last value. No injectivity is enforced.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Image of `key`, if assigned.
    #[must_use]
    pub fn get(&self, key: NodeId) -> Option<NodeId> {
        self.pairs.get(&key).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: NodeId) -> bool {
        self.pairs.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, *v))
    }

    /// Domain ids that have an assignment.
    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pairs.keys().copied()
    }

    /// The set of assigned values.
    #[must_use]
    pub fn image(&self) -> BTreeSet<NodeId> {
        self.pairs.values().copied().collect()
    }

    /// First pair of keys sharing a value, as `(first, second, value)`.
    ///
    /// Keys are scanned in ascending order, so the result is deterministic.
    #[must_use]
    pub fn first_collision(&self) -> Option<(NodeId, NodeId, NodeId)> {
        let mut seen: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for (key, value) in self.iter() {
            if let Some(&earlier) = seen.get(&value) {
                return Some((earlier, key, value));
            }
            seen.insert(value, key);
        }
        None
    }

    /// Check that no two keys share a value.
    #[must_use]
    pub fn is_injective(&self) -> bool {
        self.first_collision().is_none()
    }
}

impl FromIterator<(NodeId, NodeId)> for Correspondence {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeId)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Lifecycle state of a `CorrespondenceBuilder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderState {
    /// No session has been started.
    #[default]
    Idle,
    /// Assignments are being collected.
    Building,
    /// Every domain element has been assigned.
    Complete,
    /// The last session was abandoned.
    Cancelled,
}

/// Assignments of the current session, as returned by `snapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub assignments: Correspondence,
    pub complete: bool,
}

/// Builds an injective correspondence in domain order.
///
/// - `assign` always targets the next unassigned domain element
/// - A codomain id can be used once per session
/// - Completing a session freezes its map; `completed()` returns it until
///   another session completes, even across later cancellations
#[derive(Debug, Clone, Default)]
pub struct CorrespondenceBuilder {
    state: BuilderState,
    domain: Vec<NodeId>,
    cursor: usize,
    assignments: BTreeMap<NodeId, NodeId>,
    /// Reverse index: target -> domain element holding it.
    used_targets: BTreeMap<NodeId, NodeId>,
    completed: Option<Correspondence>,
}

impl CorrespondenceBuilder {
    /// Create an idle builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session over `domain`.
    ///
    /// Any in-progress session is abandoned. Repeated ids keep their first
    /// position. An empty domain completes immediately.
    pub fn start(&mut self, domain: impl IntoIterator<Item = NodeId>) {
        let mut seen = BTreeSet::new();
        self.domain = domain.into_iter().filter(|id| seen.insert(*id)).collect();
        self.cursor = 0;
        self.assignments.clear();
        self.used_targets.clear();
        self.state = BuilderState::Building;
        self.complete_if_exhausted();
    }

    /// Assign `target` to the domain element under the cursor.
    pub fn assign(&mut self, target: NodeId) -> Result<(), BuilderError> {
        match self.state {
            BuilderState::Idle | BuilderState::Cancelled => return Err(BuilderError::NotBuilding),
            BuilderState::Complete => {
                return Err(BuilderError::DomainExhausted {
                    domain_len: self.domain.len(),
                });
            }
            BuilderState::Building => {}
        }

        let Some(&source) = self.domain.get(self.cursor) else {
            return Err(BuilderError::DomainExhausted {
                domain_len: self.domain.len(),
            });
        };

        if let Some(&assigned_to) = self.used_targets.get(&target) {
            return Err(BuilderError::DuplicateTarget {
                target,
                assigned_to,
            });
        }

        self.assignments.insert(source, target);
        self.used_targets.insert(target, source);
        self.cursor = self.cursor.saturating_add(1);
        self.complete_if_exhausted();
        Ok(())
    }

    /// Abandon the current session.
    ///
    /// Only the in-progress assignments are discarded; `completed()` still
    /// returns the last finished map. No-op unless building.
    pub fn cancel(&mut self) {
        if self.state != BuilderState::Building {
            return;
        }
        self.assignments.clear();
        self.used_targets.clear();
        self.cursor = 0;
        self.state = BuilderState::Cancelled;
    }

    /// The domain element awaiting assignment, if a session is in progress.
    #[must_use]
    pub fn current_domain_element(&self) -> Option<NodeId> {
        match self.state {
            BuilderState::Building => self.domain.get(self.cursor).copied(),
            _ => None,
        }
    }

    /// Domain elements still waiting for an assignment, in order.
    #[must_use]
    pub fn pending(&self) -> &[NodeId] {
        match self.state {
            BuilderState::Building => self.domain.get(self.cursor..).unwrap_or_default(),
            _ => &[],
        }
    }

    /// Assignments of the current session so far.
    ///
    /// Usable mid-session for live feedback. Empty when idle or cancelled.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            assignments: Correspondence::from_pairs(
                self.assignments.iter().map(|(k, v)| (*k, *v)),
            ),
            complete: self.state == BuilderState::Complete,
        }
    }

    /// The frozen map of the most recently completed session.
    #[must_use]
    pub fn completed(&self) -> Option<&Correspondence> {
        self.completed.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Domain sequence of the current (or last) session.
    #[must_use]
    pub fn domain(&self) -> &[NodeId] {
        &self.domain
    }

    fn complete_if_exhausted(&mut self) {
        if self.cursor >= self.domain.len() {
            self.state = BuilderState::Complete;
            self.completed = Some(Correspondence::from_pairs(
                self.assignments.iter().map(|(k, v)| (*k, *v)),
            ));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn new_builder_is_idle() {
        let builder = CorrespondenceBuilder::new();
        assert_eq!(builder.state(), BuilderState::Idle);
        assert_eq!(builder.current_domain_element(), None);
        assert!(builder.completed().is_none());
    }

    #[test]
    fn assigns_in_domain_order_until_complete() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[1, 2]));

        assert_eq!(builder.current_domain_element(), Some(NodeId(1)));
        builder.assign(NodeId(10)).expect("assign 1");
        assert_eq!(builder.current_domain_element(), Some(NodeId(2)));
        assert_eq!(builder.state(), BuilderState::Building);

        builder.assign(NodeId(20)).expect("assign 2");
        assert_eq!(builder.state(), BuilderState::Complete);
        assert_eq!(builder.current_domain_element(), None);

        let map = builder.completed().expect("frozen");
        assert_eq!(map.get(NodeId(1)), Some(NodeId(10)));
        assert_eq!(map.get(NodeId(2)), Some(NodeId(20)));
    }

    #[test]
    fn duplicate_target_is_rejected_and_cursor_stays() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[1, 2]));
        builder.assign(NodeId(10)).expect("assign");

        let err = builder.assign(NodeId(10)).expect_err("duplicate");
        assert_eq!(
            err,
            BuilderError::DuplicateTarget {
                target: NodeId(10),
                assigned_to: NodeId(1),
            }
        );
        assert_eq!(builder.current_domain_element(), Some(NodeId(2)));

        builder.assign(NodeId(11)).expect("retry with another target");
        assert_eq!(builder.state(), BuilderState::Complete);
    }

    #[test]
    fn assign_after_complete_is_domain_exhausted() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[1]));
        builder.assign(NodeId(5)).expect("assign");

        let err = builder.assign(NodeId(6)).expect_err("exhausted");
        assert_eq!(err, BuilderError::DomainExhausted { domain_len: 1 });
    }

    #[test]
    fn assign_without_session_is_not_building() {
        let mut builder = CorrespondenceBuilder::new();
        assert_eq!(builder.assign(NodeId(1)), Err(BuilderError::NotBuilding));

        builder.start(ids(&[1, 2]));
        builder.cancel();
        assert_eq!(builder.assign(NodeId(1)), Err(BuilderError::NotBuilding));
    }

    #[test]
    fn empty_domain_completes_immediately() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(Vec::new());

        assert_eq!(builder.state(), BuilderState::Complete);
        assert!(builder.completed().expect("frozen").is_empty());
    }

    #[test]
    fn cancel_keeps_previous_completed_map() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[1]));
        builder.assign(NodeId(7)).expect("assign");

        builder.start(ids(&[1, 2]));
        builder.assign(NodeId(8)).expect("assign");
        builder.cancel();

        assert_eq!(builder.state(), BuilderState::Cancelled);
        assert!(builder.snapshot().assignments.is_empty());
        let previous = builder.completed().expect("previous map");
        assert_eq!(previous.get(NodeId(1)), Some(NodeId(7)));
        assert_eq!(previous.len(), 1);
    }

    #[test]
    fn snapshot_reports_partial_progress() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[3, 1, 2]));
        builder.assign(NodeId(30)).expect("assign");

        let snapshot = builder.snapshot();
        assert!(!snapshot.complete);
        assert_eq!(snapshot.assignments.get(NodeId(3)), Some(NodeId(30)));
        assert_eq!(builder.pending(), ids(&[1, 2]).as_slice());
    }

    #[test]
    fn start_collapses_repeated_domain_ids() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[2, 1, 2, 1]));
        assert_eq!(builder.domain(), ids(&[2, 1]).as_slice());
    }

    #[test]
    fn restart_while_building_discards_session() {
        let mut builder = CorrespondenceBuilder::new();
        builder.start(ids(&[1, 2]));
        builder.assign(NodeId(9)).expect("assign");

        builder.start(ids(&[1, 2]));
        assert!(builder.snapshot().assignments.is_empty());
        builder.assign(NodeId(9)).expect("target is free again");
    }

    #[test]
    fn collision_detection_is_deterministic() {
        let map = Correspondence::from_pairs([
            (NodeId(3), NodeId(9)),
            (NodeId(1), NodeId(9)),
            (NodeId(2), NodeId(8)),
        ]);
        assert!(!map.is_injective());
        assert_eq!(map.first_collision(), Some((NodeId(1), NodeId(3), NodeId(9))));
    }
}
