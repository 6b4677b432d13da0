//! Simplified ingestion for agents and automation hooks.
//!
//! Callers send a title and body; the id is derived from the title, the
//! connection list can be filled from suggestions, and each target can be
//! given the reverse connection back to the new node.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::config::{AUTO_CONNECT_LIMIT, AUTO_CONNECT_MIN_SCORE, DEFAULT_DOMAIN, INGEST_SLUG_MAX_LEN};
use crate::error::VaultError;
use crate::models::{Connection, Node, NodeType};
use crate::storage::RecordStore;
use crate::suggest::Draft;
use crate::vault::{NewNode, Vault};

/// Runs of characters that do not survive in a slug.
const SLUG_SEPARATOR_PATTERN: &str = r"[^a-z0-9]+";

fn slug_separator() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SLUG_SEPARATOR_PATTERN).ok())
        .as_ref()
}

/// Lowercase `title`, collapse anything outside `[a-z0-9]` to `-`, trim
/// dashes from both ends and cut to `max_len` characters.
pub fn slugify(title: &str, max_len: usize) -> String {
    let lower = title.to_lowercase();
    let dashed = match slug_separator() {
        Some(re) => re.replace_all(&lower, "-").into_owned(),
        None => lower
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
            .collect(),
    };
    dashed.trim_matches('-').chars().take(max_len).collect()
}

/// A node to ingest. Only `node_type` and `title` are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    /// Explicit id. Derived as `<type>-<slug>` when absent.
    pub id: Option<String>,
    pub node_type: NodeType,
    pub title: String,
    pub domain: Option<String>,
    pub tags: Vec<String>,
    pub confidence: Option<String>,
    pub content: String,
    pub connections: Vec<Connection>,
    /// Replace `connections` with the best suggestions for this node.
    pub auto_connect: bool,
    /// Add the reverse connection on every existing target.
    pub mirror: bool,
    /// Maximum length of a derived slug.
    pub slug_max_len: usize,
}

impl IngestRequest {
    pub fn new(node_type: NodeType, title: impl Into<String>) -> Self {
        Self {
            id: None,
            node_type,
            title: title.into(),
            domain: None,
            tags: Vec::new(),
            confidence: None,
            content: String::new(),
            connections: Vec::new(),
            auto_connect: false,
            mirror: false,
            slug_max_len: INGEST_SLUG_MAX_LEN,
        }
    }

    /// The id this request will create.
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!(
                "{}-{}",
                self.node_type,
                slugify(&self.title, self.slug_max_len)
            ),
        }
    }
}

/// Result of a successful ingest.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub node: Node,
    /// Connections that came from suggestions.
    pub auto_connections: usize,
    /// Targets that received a mirrored connection.
    pub mirrored: Vec<String>,
}

/// Creates a node from `request`.
///
/// Fails with [`VaultError::DuplicateId`] when the resolved id is taken.
pub fn ingest<S: RecordStore>(
    vault: &mut Vault<S>,
    request: IngestRequest,
) -> Result<IngestOutcome, VaultError> {
    let id = request.resolved_id();
    if vault.contains(&id) {
        return Err(VaultError::DuplicateId(id));
    }

    let domain = request
        .domain
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

    let mut connections = request.connections;
    let mut auto_connections = 0;
    if request.auto_connect {
        let draft = Draft {
            title: request.title.clone(),
            domain: domain.clone(),
            tags: request.tags.clone(),
            content: request.content.clone(),
        };
        connections = vault
            .suggest(&draft)
            .into_iter()
            .filter(|s| s.score > AUTO_CONNECT_MIN_SCORE)
            .take(AUTO_CONNECT_LIMIT)
            .map(|s| Connection::new(s.id, s.suggested_edge))
            .collect();
        auto_connections = connections.len();
    }

    let mut new_node = NewNode::new(id, request.node_type, request.title)
        .with_domain(domain)
        .with_tags(request.tags)
        .with_content(request.content)
        .with_connections(connections);
    new_node.confidence = request.confidence;

    let node = vault.create(new_node)?;

    let mut mirrored = Vec::new();
    if request.mirror {
        for conn in &node.meta.connections {
            if conn.target.is_empty() || conn.target == node.meta.id {
                continue;
            }
            let back = Connection::new(node.meta.id.clone(), conn.edge.reverse());
            match vault.add_connections(&conn.target, vec![back]) {
                Ok(Some(_)) => mirrored.push(conn.target.clone()),
                Ok(None) => {}
                Err(e) => {
                    warn!(target = %conn.target, error = %e, "failed to mirror connection");
                }
            }
        }
    }

    info!(
        id = %node.meta.id,
        auto_connections,
        mirrored = mirrored.len(),
        "ingested node"
    );

    Ok(IngestOutcome {
        node,
        auto_connections,
        mirrored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("comparisonTable crashes CMS!", 60), "comparisontable-crashes-cms");
        assert_eq!(slugify("  --Hello,  World--  ", 60), "hello-world");
        assert_eq!(slugify("Ünïcode & stuff", 60), "n-code-stuff");
    }

    #[test]
    fn test_slugify_truncates_after_trimming() {
        assert_eq!(slugify("abc def ghi", 4), "abc-");
        assert_eq!(slugify("abcdef", 3), "abc");
    }

    #[test]
    fn test_resolved_id() {
        let mut request = IngestRequest::new(NodeType::Lesson, "Timeouts Bite");
        assert_eq!(request.resolved_id(), "lesson-timeouts-bite");

        request.id = Some("lesson-custom".into());
        assert_eq!(request.resolved_id(), "lesson-custom");

        request.id = Some("  ".into());
        assert_eq!(request.resolved_id(), "lesson-timeouts-bite");
    }
}
