//! Edge types (relationships) for the knowledge graph.
//!
//! Edges are never stored on their own. Every edge is derived from one entry
//! in the source node's `connections` list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::Node;

/// Relationship type between two nodes.
///
/// Labels outside the known set are kept verbatim in [`EdgeType::Other`] so
/// hand-edited files survive a rewrite unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    PartOf,
    Contains,
    Uses,
    UsedBy,
    DependsOn,
    Enables,
    #[default]
    RelatedTo,
    Other(String),
}

impl EdgeType {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::PartOf => "part_of",
            EdgeType::Contains => "contains",
            EdgeType::Uses => "uses",
            EdgeType::UsedBy => "used_by",
            EdgeType::DependsOn => "depends_on",
            EdgeType::Enables => "enables",
            EdgeType::RelatedTo => "related_to",
            EdgeType::Other(label) => label,
        }
    }

    /// Edge type to declare on the target when mirroring this connection.
    pub fn reverse(&self) -> EdgeType {
        match self {
            EdgeType::PartOf => EdgeType::Contains,
            EdgeType::Contains => EdgeType::PartOf,
            EdgeType::Uses => EdgeType::UsedBy,
            EdgeType::UsedBy => EdgeType::Uses,
            EdgeType::DependsOn => EdgeType::Enables,
            EdgeType::Enables => EdgeType::DependsOn,
            EdgeType::RelatedTo | EdgeType::Other(_) => EdgeType::RelatedTo,
        }
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        match s {
            "part_of" => EdgeType::PartOf,
            "contains" => EdgeType::Contains,
            "uses" => EdgeType::Uses,
            "used_by" => EdgeType::UsedBy,
            "depends_on" => EdgeType::DependsOn,
            "enables" => EdgeType::Enables,
            "related_to" | "" => EdgeType::RelatedTo,
            other => EdgeType::Other(other.to_string()),
        }
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType::from(s.as_str())
    }
}

impl From<EdgeType> for String {
    fn from(edge: EdgeType) -> Self {
        match edge {
            EdgeType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge derived from `source`'s connection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// A node adjacent to the queried node, with the type of the edge joining them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub node: Node,
    pub edge: EdgeType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_mapping() {
        assert_eq!(EdgeType::PartOf.reverse(), EdgeType::Contains);
        assert_eq!(EdgeType::Contains.reverse(), EdgeType::PartOf);
        assert_eq!(EdgeType::Uses.reverse(), EdgeType::UsedBy);
        assert_eq!(EdgeType::UsedBy.reverse(), EdgeType::Uses);
        assert_eq!(EdgeType::DependsOn.reverse(), EdgeType::Enables);
        assert_eq!(EdgeType::Enables.reverse(), EdgeType::DependsOn);
        assert_eq!(EdgeType::RelatedTo.reverse(), EdgeType::RelatedTo);
        assert_eq!(
            EdgeType::Other("inspired_by".into()).reverse(),
            EdgeType::RelatedTo
        );
    }

    #[test]
    fn test_unknown_label_is_preserved() {
        let edge = EdgeType::from("inspired_by");
        assert_eq!(edge, EdgeType::Other("inspired_by".to_string()));
        assert_eq!(String::from(edge), "inspired_by");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&EdgeType::DependsOn).unwrap();
        assert_eq!(json, "\"depends_on\"");
        let parsed: EdgeType = serde_json::from_str("\"used_by\"").unwrap();
        assert_eq!(parsed, EdgeType::UsedBy);
    }
}
