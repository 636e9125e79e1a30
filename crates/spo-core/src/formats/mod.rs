//! # Interchange Formats
//!
//! Serde-shaped views of core values for the outer layers.
//!
//! - `node_link`: the node-link JSON shape (`nodes` / `links`) used by
//!   graph editors, plus the rewrite request that bundles three graphs and
//!   two mappings
//!
//! Only the shapes live here; reading files and HTTP bodies is the app
//! layer's job.

pub mod node_link;

pub use node_link::{
    LinkJson, NodeJson, NodeLinkGraph, RawNodeId, RewriteRequest, correspondence_from_json,
    correspondence_to_json,
};
