//! Node types for the knowledge graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::edge::EdgeType;
use super::STATUS_ARCHIVED;

/// The closed set of node kinds a vault may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// A repeatable capability or technique.
    Skill,
    /// Something learned the hard way.
    Lesson,
    /// A body of work other nodes belong to.
    Project,
    /// A piece of software or service that gets used.
    Tool,
    /// An abstract idea other nodes build on.
    Concept,
    /// External material worth keeping.
    Reference,
}

impl NodeType {
    /// Every node type, in declaration order.
    pub const ALL: [NodeType; 6] = [
        NodeType::Skill,
        NodeType::Lesson,
        NodeType::Project,
        NodeType::Tool,
        NodeType::Concept,
        NodeType::Reference,
    ];

    /// Returns the header spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Skill => "skill",
            NodeType::Lesson => "lesson",
            NodeType::Project => "project",
            NodeType::Tool => "tool",
            NodeType::Concept => "concept",
            NodeType::Reference => "reference",
        }
    }

    /// Returns the vault directory that holds nodes of this type.
    pub fn dir_name(&self) -> &'static str {
        match self {
            NodeType::Skill => "skills",
            NodeType::Lesson => "lessons",
            NodeType::Project => "projects",
            NodeType::Tool => "tools",
            NodeType::Concept => "concepts",
            NodeType::Reference => "references",
        }
    }

    /// Whether files of this type are nested under a domain subdirectory.
    pub fn nests_by_domain(&self) -> bool {
        matches!(self, NodeType::Skill | NodeType::Tool)
    }

    /// Edge type proposed when a node of this type is suggested as a target.
    pub fn suggested_edge(&self) -> EdgeType {
        match self {
            NodeType::Project => EdgeType::PartOf,
            NodeType::Concept => EdgeType::DependsOn,
            NodeType::Tool => EdgeType::Uses,
            _ => EdgeType::RelatedTo,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`NodeType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node type: {0}")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownNodeType(s.to_string()))
    }
}

/// A declared connection from the owning node to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Target node id. May be empty in hand-edited files.
    #[serde(default)]
    pub target: String,
    /// Relationship type.
    #[serde(default)]
    pub edge: EdgeType,
}

impl Connection {
    pub fn new(target: impl Into<String>, edge: EdgeType) -> Self {
        Self {
            target: target.into(),
            edge,
        }
    }
}

/// Front-matter header of a node, after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub status: String,
    pub confidence: String,
    /// Creation date (`YYYY-MM-DD`), empty if unknown.
    pub created: String,
    /// Last update date (`YYYY-MM-DD`), empty if unknown.
    pub updated: String,
    pub connections: Vec<Connection>,
}

/// A knowledge record held by the vault index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(flatten)]
    pub meta: NodeMeta,
    /// Markdown body without the front matter.
    pub content: String,
    /// Exact file text as last read or written.
    #[serde(skip)]
    pub raw: String,
    /// Path relative to the vault root, `/`-separated.
    pub file_path: String,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn is_archived(&self) -> bool {
        self.meta.status == STATUS_ARCHIVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parse() {
        assert_eq!("tool".parse::<NodeType>().unwrap(), NodeType::Tool);
        assert_eq!(
            "widget".parse::<NodeType>().unwrap_err(),
            UnknownNodeType("widget".to_string())
        );
    }

    #[test]
    fn test_dir_layout() {
        assert_eq!(NodeType::Reference.dir_name(), "references");
        assert!(NodeType::Skill.nests_by_domain());
        assert!(NodeType::Tool.nests_by_domain());
        assert!(!NodeType::Lesson.nests_by_domain());
    }

    #[test]
    fn test_suggested_edge() {
        assert_eq!(NodeType::Project.suggested_edge(), EdgeType::PartOf);
        assert_eq!(NodeType::Concept.suggested_edge(), EdgeType::DependsOn);
        assert_eq!(NodeType::Tool.suggested_edge(), EdgeType::Uses);
        assert_eq!(NodeType::Lesson.suggested_edge(), EdgeType::RelatedTo);
    }
}
