//! # Graph Model
//!
//! The simple undirected graph shared by the input, pattern, and replacement
//! sides of a rule.
//!
//! - At most one edge per unordered pair, no self-loops
//! - Every edge endpoint is a node of the graph
//! - Node identifiers come from a per-graph allocator starting at 1 and are
//!   never reused, even after deletion
//! - Identifiers never exceed `MAX_NODE_ID`
//!
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.
//! Operations on absent ids are no-ops.

use crate::primitives::{FIRST_NODE_ID, MAX_NODE_ID};
use crate::{Node, NodeId, Position};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// A simple undirected graph with positioned nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Symmetric adjacency: node -> neighbors.
    /// Both directions of every edge are stored.
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Next identifier handed out by `add_node`.
    next_node_id: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            next_node_id: FIRST_NODE_ID,
        }
    }
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Allocate the next identifier and add a node at `(x, y)`.
    ///
    /// Returns `None` once the allocator has passed `MAX_NODE_ID`; the graph
    /// is left unchanged.
    pub fn add_node(&mut self, x: f64, y: f64) -> Option<NodeId> {
        if self.next_node_id > MAX_NODE_ID {
            return None;
        }
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, Position::new(x, y)));
        self.adjacency.insert(id, BTreeSet::new());
        Some(id)
    }

    /// Insert a node with a caller-chosen identifier.
    ///
    /// Used when rebuilding a graph from interchange data or from a rewrite.
    /// The allocator is moved past `id` so later `add_node` calls never
    /// collide with it. An existing node with the same id keeps its edges
    /// and takes the new position. Ids above `MAX_NODE_ID` are refused and
    /// `false` is returned.
    pub fn insert_node_with_id(&mut self, id: NodeId, position: Position) -> bool {
        if id.0 > MAX_NODE_ID {
            return false;
        }
        if id.0 >= self.next_node_id {
            self.next_node_id = id.0 + 1;
        }
        self.nodes.insert(id, Node::new(id, position));
        self.adjacency.entry(id).or_default();
        true
    }

    /// Remove a node and every edge incident to it.
    ///
    /// Returns the number of edges removed with it. Absent ids are a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> usize {
        if self.nodes.remove(&id).is_none() {
            return 0;
        }
        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for neighbor in &neighbors {
            if let Some(set) = self.adjacency.get_mut(neighbor) {
                set.remove(&id);
            }
        }
        neighbors.len()
    }

    /// Add the edge `{a, b}` if absent, remove it if present.
    ///
    /// Ignores `a == b` and pairs with a missing endpoint.
    pub fn toggle_edge(&mut self, a: NodeId, b: NodeId) {
        if self.has_edge(a, b) {
            self.remove_edge(a, b);
        } else {
            self.insert_edge(a, b);
        }
    }

    /// Add the edge `{a, b}`.
    ///
    /// Returns `true` only if a new edge was created: an existing edge,
    /// a self-loop or a missing endpoint all leave the graph unchanged.
    pub fn insert_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.contains_node(a) || !self.contains_node(b) {
            return false;
        }
        let created = self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        created
    }

    /// Remove the edge `{a, b}`. Returns `true` if it existed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let removed = self
            .adjacency
            .get_mut(&a)
            .is_some_and(|set| set.remove(&b));
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.remove(&a);
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Check if the unordered edge `{a, b}` exists.
    #[must_use]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Neighbors of a node in ascending order. Empty for absent ids.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Number of edges incident to a node.
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Position of a node, if present.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.nodes.get(&id).map(|node| node.position)
    }

    /// Every edge once, as `(smaller, larger)`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().flat_map(|(from, targets)| {
            targets
                .range((std::ops::Bound::Excluded(*from), std::ops::Bound::Unbounded))
                .map(move |to| (*from, *to))
        })
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Check if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Largest node id currently present.
    #[must_use]
    pub fn max_node_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    /// The id the next `add_node` call will hand out.
    #[must_use]
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next_node_id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
