//! Data model for the knowledge graph.
//!
//! - [`Node`] - a single knowledge record backed by one markdown file
//! - [`NodeMeta`] - the front-matter header of a node
//! - [`Edge`] - a directed, typed relationship derived from a node's connections

mod edge;
mod node;

pub use edge::{Edge, EdgeType, Neighbor};
pub use node::{Connection, Node, NodeMeta, NodeType, UnknownNodeType};

/// Status assigned to newly created nodes.
pub const STATUS_ACTIVE: &str = "active";

/// Status assigned by the archive operation.
pub const STATUS_ARCHIVED: &str = "archived";
