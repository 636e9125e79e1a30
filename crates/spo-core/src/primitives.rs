//! # Primitives
//!
//! Hardcoded constants of the rewrite core.
//!
//! These are compiled into the binary and are immutable at runtime.

/// First identifier handed out by a graph's node allocator.
///
/// Identifiers are positive; `0` is reserved and rejected on import.
pub const FIRST_NODE_ID: u64 = 1;

/// Largest identifier a graph accepts.
///
/// Imported ids above this are rejected, and the rewrite engine refuses to
/// allocate past it. The allocator therefore never reaches `u64::MAX`, and
/// every id also fits the signed integers JSON clients use.
pub const MAX_NODE_ID: u64 = i64::MAX as u64;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of nodes in a single imported graph.
///
/// Graphs larger than this are rejected by the node-link importer.
/// This bounds the cost of a single rewrite request.
pub const MAX_GRAPH_NODES: usize = 10_000;

/// Maximum number of links in a single imported graph.
pub const MAX_GRAPH_EDGES: usize = 100_000;

/// Maximum number of entries in a single imported mapping.
///
/// A mapping never needs more entries than its domain graph has nodes.
pub const MAX_MAPPING_ENTRIES: usize = MAX_GRAPH_NODES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_node_id_is_positive() {
        assert_eq!(FIRST_NODE_ID, 1);
    }

    #[test]
    fn node_id_range_leaves_room_to_allocate() {
        assert!(FIRST_NODE_ID < MAX_NODE_ID);
        assert!(MAX_NODE_ID.checked_add(MAX_GRAPH_NODES as u64).is_some());
    }

    #[test]
    fn mapping_limit_matches_graph_limit() {
        assert_eq!(MAX_MAPPING_ENTRIES, MAX_GRAPH_NODES);
    }
}
