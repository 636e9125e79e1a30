//! # Node-Link Format
//!
//! JSON shape of a graph as exchanged with editors:
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "x": 10.0, "y": 20.0}, {"id": "2"}],
//!   "links": [{"source": 1, "target": "2"}]
//! }
//! ```
//!
//! Ids are accepted as integers or numeric strings. Missing coordinates
//! default to 0. Conversion into a `Graph` checks the simple-graph model:
//! unique positive ids, known endpoints, no self-loops, undirected.
//!
//! ## Security
//!
//! Node, link, and mapping counts are bounded by the limits in
//! `primitives` before anything is allocated for them.

use crate::correspondence::Correspondence;
use crate::graph::Graph;
use crate::primitives::{
    FIRST_NODE_ID, MAX_GRAPH_EDGES, MAX_GRAPH_NODES, MAX_MAPPING_ENTRIES, MAX_NODE_ID,
};
use crate::rewrite::{RewriteArtifacts, RewriteOptions};
use crate::{FormatError, GraphRole, NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// NODE IDS
// =============================================================================

/// A node id as it appears on the wire: an integer or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNodeId {
    Int(i64),
    Text(String),
}

impl RawNodeId {
    /// Normalize into a positive `NodeId`.
    ///
    /// `context` names where the id came from, for the error message.
    pub fn resolve(&self, context: &str) -> Result<NodeId, FormatError> {
        let parsed = match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse::<u64>().ok(),
        };
        match parsed {
            Some(id) if (FIRST_NODE_ID..=MAX_NODE_ID).contains(&id) => Ok(NodeId(id)),
            _ => Err(FormatError::InvalidNodeId {
                raw: self.to_string(),
                context: context.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RawNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<NodeId> for RawNodeId {
    fn from(id: NodeId) -> Self {
        // Graph ids never pass MAX_NODE_ID (i64::MAX); the text arm is unreachable in practice.
        i64::try_from(id.0).map_or_else(|_| Self::Text(id.0.to_string()), Self::Int)
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// A node entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeJson {
    pub id: RawNodeId,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// A link entry. Orientation is irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkJson {
    pub source: RawNodeId,
    pub target: RawNodeId,
}

/// A graph in node-link form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    /// Free-form graph attributes. Opaque to the rewrite.
    #[serde(default)]
    pub graph: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
    #[serde(default, alias = "edges")]
    pub links: Vec<LinkJson>,
}

impl NodeLinkGraph {
    /// Emit a graph: nodes and links ascending, every coordinate present.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| NodeJson {
                id: node.id.into(),
                x: Some(node.position.x),
                y: Some(node.position.y),
            })
            .collect();
        let links = graph
            .edges()
            .map(|(a, b)| LinkJson {
                source: a.into(),
                target: b.into(),
            })
            .collect();

        Self {
            directed: false,
            multigraph: false,
            graph: serde_json::Map::new(),
            nodes,
            links,
        }
    }

    /// Build a `Graph`, checking the simple-graph model.
    ///
    /// Repeated links between the same pair collapse into one edge.
    pub fn to_graph(&self, role: GraphRole) -> Result<Graph, FormatError> {
        if self.directed {
            return Err(FormatError::DirectedGraph { role });
        }
        if self.multigraph {
            return Err(FormatError::Multigraph { role });
        }
        check_limit(format!("{} graph nodes", role), self.nodes.len(), MAX_GRAPH_NODES)?;
        check_limit(format!("{} graph links", role), self.links.len(), MAX_GRAPH_EDGES)?;

        let mut graph = Graph::new();
        let mut seen = BTreeSet::new();
        let node_context = format!("{} node", role);
        for node in &self.nodes {
            let id = node.id.resolve(&node_context)?;
            if !seen.insert(id) {
                return Err(FormatError::DuplicateNode { role, node: id });
            }
            let position = Position::new(node.x.unwrap_or_default(), node.y.unwrap_or_default());
            graph.insert_node_with_id(id, position);
        }

        let link_context = format!("{} link", role);
        for link in &self.links {
            let source = link.source.resolve(&link_context)?;
            let target = link.target.resolve(&link_context)?;
            if source == target {
                return Err(FormatError::SelfLoop { role, node: source });
            }
            for endpoint in [source, target] {
                if !graph.contains_node(endpoint) {
                    return Err(FormatError::UnknownEndpoint {
                        role,
                        link: (source, target),
                        missing: endpoint,
                    });
                }
            }
            graph.insert_edge(source, target);
        }

        Ok(graph)
    }
}

// =============================================================================
// MAPPINGS
// =============================================================================

/// Convert a JSON object `{ "key id": value id }` into a correspondence.
///
/// Ids are only parsed here; whether they exist in any graph is for the
/// validators to decide.
pub fn correspondence_from_json(
    mapping: &BTreeMap<String, RawNodeId>,
    name: &str,
) -> Result<Correspondence, FormatError> {
    check_limit(format!("{} mapping", name), mapping.len(), MAX_MAPPING_ENTRIES)?;

    let key_context = format!("{} mapping key", name);
    let value_context = format!("{} mapping value", name);
    let mut pairs = BTreeMap::new();
    for (key, value) in mapping {
        let key = RawNodeId::Text(key.clone()).resolve(&key_context)?;
        let value = value.resolve(&value_context)?;
        // "1" and "01" are distinct JSON keys for the same node.
        if pairs.insert(key, value).is_some() {
            return Err(FormatError::DuplicateMappingKey {
                mapping: name.to_string(),
                node: key,
            });
        }
    }
    Ok(Correspondence::from_pairs(pairs))
}

/// Convert a correspondence back into its JSON object form.
#[must_use]
pub fn correspondence_to_json(map: &Correspondence) -> BTreeMap<String, RawNodeId> {
    map.iter()
        .map(|(key, value)| (key.to_string(), value.into()))
        .collect()
}

fn check_limit(what: String, count: usize, max: usize) -> Result<(), FormatError> {
    if count > max {
        return Err(FormatError::TooLarge { what, count, max });
    }
    Ok(())
}

// =============================================================================
// REWRITE REQUEST
// =============================================================================

/// Everything needed for one rewrite, as sent by a client.
///
/// Field names follow the `/calculate` wire format; the shorter names
/// (`input`, `lhs`, `rhs`, `lhs_to_input`, `rhs_to_lhs`) are accepted too.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RewriteRequest {
    #[serde(rename = "graph_input", alias = "input")]
    pub input: NodeLinkGraph,
    #[serde(rename = "graph_lhs", alias = "lhs")]
    pub lhs: NodeLinkGraph,
    #[serde(rename = "graph_rhs", alias = "rhs")]
    pub rhs: NodeLinkGraph,
    #[serde(rename = "mapping_lhs_to_input", alias = "lhs_to_input", default)]
    pub lhs_to_input: BTreeMap<String, RawNodeId>,
    #[serde(rename = "mapping_rhs_to_lhs", alias = "rhs_to_lhs", default)]
    pub rhs_to_lhs: BTreeMap<String, RawNodeId>,
    #[serde(default)]
    pub delete_unpreserved_edges: bool,
}

impl RewriteRequest {
    /// Parse graphs and mappings into core values.
    pub fn to_artifacts(&self) -> Result<RewriteArtifacts, FormatError> {
        Ok(RewriteArtifacts {
            input: self.input.to_graph(GraphRole::Input)?,
            lhs: self.lhs.to_graph(GraphRole::Lhs)?,
            rhs: self.rhs.to_graph(GraphRole::Rhs)?,
            lhs_to_input: correspondence_from_json(&self.lhs_to_input, "lhs_to_input")?,
            rhs_to_lhs: correspondence_from_json(&self.rhs_to_lhs, "rhs_to_lhs")?,
        })
    }

    /// Emit a rewrite result, keeping the input graph's attributes.
    #[must_use]
    pub fn output_graph(&self, graph: &Graph) -> NodeLinkGraph {
        NodeLinkGraph {
            graph: self.input.graph.clone(),
            ..NodeLinkGraph::from_graph(graph)
        }
    }

    /// Rewrite options carried by the request.
    #[must_use]
    pub fn options(&self) -> RewriteOptions {
        RewriteOptions {
            delete_unpreserved_edges: self.delete_unpreserved_edges,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
