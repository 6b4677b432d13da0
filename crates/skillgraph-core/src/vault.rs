use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{SuggestConfig, VaultConfig, DEFAULT_CONFIDENCE, DEFAULT_DOMAIN};
use crate::error::VaultError;
use crate::index::{ScanSummary, VaultIndex};
use crate::models::{Connection, Node, NodeMeta, NodeType, STATUS_ACTIVE, STATUS_ARCHIVED};
use crate::record;
use crate::storage::{FileStore, RecordStore};
use crate::suggest::{Draft, Suggestion};

/// Input for [`Vault::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub id: String,
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub confidence: Option<String>,
    pub content: String,
    pub connections: Vec<Connection>,
}

impl NewNode {
    /// A node with no tags, connections or content in the default domain.
    pub fn new(id: impl Into<String>, node_type: NodeType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            title: title.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            tags: Vec::new(),
            confidence: None,
            content: String::new(),
            connections: Vec::new(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }
}

/// Fields to change in [`Vault::update`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<Vec<String>>,
    pub confidence: Option<String>,
    pub content: Option<String>,
    pub connections: Option<Vec<Connection>>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A vault: the node index plus the store its records live in.
///
/// Every mutation writes the record first and patches the index only once the
/// write succeeded, so a failed write leaves the index as it was.
pub struct Vault<S: RecordStore> {
    index: VaultIndex,
    store: S,
    config: VaultConfig,
    suggest: SuggestConfig,
}

impl Vault<FileStore> {
    /// Opens the vault at `config.root` and scans it.
    ///
    /// A root that does not exist yet opens as an empty vault; the first
    /// write creates it.
    pub fn open(config: VaultConfig) -> Result<Self, VaultError> {
        let store = FileStore::new(config.root.clone());
        let mut vault = Self::new(store, config);
        match vault.rescan() {
            Ok(_) => {}
            Err(VaultError::RootNotFound(root)) => {
                warn!(root = %root.display(), "vault root does not exist yet; starting empty");
            }
            Err(e) => return Err(e),
        }
        Ok(vault)
    }
}

impl<S: RecordStore> Vault<S> {
    /// Creates a vault over `store` with an empty index.
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self {
            index: VaultIndex::new(),
            store,
            config,
            suggest: SuggestConfig::default(),
        }
    }

    /// Replaces the suggestion thresholds.
    pub fn with_suggest_config(mut self, suggest: SuggestConfig) -> Self {
        self.suggest = suggest;
        self
    }

    pub fn index(&self) -> &VaultIndex {
        &self.index
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn suggest_config(&self) -> &SuggestConfig {
        &self.suggest
    }

    /// Looks up a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Rebuilds the index from the store's root.
    pub fn rescan(&mut self) -> Result<ScanSummary, VaultError> {
        let root = self.store.root().to_path_buf();
        self.index.scan_with_extension(&root, &self.config.extension)
    }

    /// Connection suggestions for `draft` using the configured thresholds.
    pub fn suggest(&self, draft: &Draft) -> Vec<Suggestion> {
        self.index.suggest_connections(draft, &self.suggest)
    }

    /// Writes a new record and adds it to the index.
    ///
    /// Does not check for an existing id; callers use [`Vault::contains`]
    /// first. Creating over an existing id replaces it.
    pub fn create(&mut self, new: NewNode) -> Result<Node, VaultError> {
        let today = today();
        let meta = NodeMeta {
            id: new.id,
            node_type: new.node_type,
            title: new.title,
            domain: new.domain,
            tags: new.tags,
            status: STATUS_ACTIVE.to_string(),
            confidence: new
                .confidence
                .unwrap_or_else(|| DEFAULT_CONFIDENCE.to_string()),
            created: today.clone(),
            updated: today,
            connections: new.connections,
        };

        let rel_path = record_path(&meta, &self.config.extension);
        let node = self.write_record(meta, &new.content, rel_path)?;

        self.index
            .replace_edges_from(&node.meta.id, &node.meta.connections);
        self.index.upsert(node.clone());

        info!(id = %node.meta.id, path = %node.file_path, "created node");
        Ok(node)
    }

    /// Applies `changes` to an existing node and rewrites it in place.
    ///
    /// Returns `Ok(None)` for an unknown id. A replaced connection list also
    /// replaces the node's edges.
    pub fn update(&mut self, id: &str, changes: NodeUpdate) -> Result<Option<Node>, VaultError> {
        let Some(current) = self.index.get(id) else {
            return Ok(None);
        };

        let mut meta = current.meta.clone();
        let content = changes.content.unwrap_or_else(|| current.content.clone());
        let rel_path = current.file_path.clone();

        if let Some(title) = changes.title {
            meta.title = title;
        }
        if let Some(domain) = changes.domain {
            meta.domain = domain;
        }
        if let Some(tags) = changes.tags {
            meta.tags = tags;
        }
        if let Some(confidence) = changes.confidence {
            meta.confidence = confidence;
        }
        if let Some(connections) = changes.connections {
            meta.connections = connections;
        }
        meta.updated = today();

        let node = self.write_record(meta, &content, rel_path)?;

        self.index.replace_edges_from(id, &node.meta.connections);
        self.index.upsert(node.clone());

        info!(id = %id, "updated node");
        Ok(Some(node))
    }

    /// Appends connections a node does not already declare.
    ///
    /// Duplicates (same target and edge) are dropped, both against the node and
    /// within `connections`. When nothing is new the node is returned unchanged
    /// and its file is not touched.
    pub fn add_connections(
        &mut self,
        id: &str,
        connections: Vec<Connection>,
    ) -> Result<Option<Node>, VaultError> {
        let Some(current) = self.index.get(id) else {
            return Ok(None);
        };

        let mut seen: HashSet<&Connection> = current.meta.connections.iter().collect();
        let added: Vec<Connection> = connections
            .iter()
            .filter(|conn| seen.insert(*conn))
            .cloned()
            .collect();

        if added.is_empty() {
            debug!(id = %id, "no new connections");
            return Ok(Some(current.clone()));
        }

        let mut meta = current.meta.clone();
        meta.connections.extend(added.iter().cloned());
        meta.updated = today();
        let content = current.content.clone();
        let rel_path = current.file_path.clone();

        let node = self.write_record(meta, &content, rel_path)?;

        self.index.append_edges(id, &added);
        self.index.upsert(node.clone());

        info!(id = %id, added = added.len(), "added connections");
        Ok(Some(node))
    }

    /// Marks a node archived and moves its record under the archive directory.
    ///
    /// The node stays indexed. Failing to delete the old file is logged and
    /// otherwise ignored.
    pub fn archive_node(&mut self, id: &str) -> Result<Option<Node>, VaultError> {
        let Some(current) = self.index.get(id) else {
            return Ok(None);
        };

        let mut meta = current.meta.clone();
        meta.status = STATUS_ARCHIVED.to_string();
        meta.updated = today();
        let content = current.content.clone();
        let old_path = current.file_path.clone();

        let archive_path = format!(
            "{}/{}.{}",
            self.config.archive_dir.trim_matches('/'),
            meta.id,
            self.config.extension
        );
        let node = self.write_record(meta, &content, archive_path)?;

        if old_path != node.file_path {
            if let Err(e) = self.store.remove(&old_path) {
                warn!(id = %id, path = %old_path, error = %e, "failed to remove archived record");
            }
        }

        self.index.upsert(node.clone());

        info!(id = %id, path = %node.file_path, "archived node");
        Ok(Some(node))
    }

    /// Encodes and writes a record, returning the node it now holds.
    ///
    /// The returned node is decoded back from the written text, so header
    /// coercion applies exactly as it does on a scan.
    fn write_record(
        &self,
        meta: NodeMeta,
        content: &str,
        rel_path: String,
    ) -> Result<Node, VaultError> {
        let raw = record::encode(content.trim(), &meta)?;
        let decoded = record::decode(&raw)?;
        self.store.write(&rel_path, &raw)?;

        Ok(Node {
            meta: decoded.meta,
            content: decoded.body,
            raw,
            file_path: rel_path,
        })
    }
}

/// Vault-relative path for a new record.
///
/// `<type>s/<domain>/<name>.<ext>` for skills and tools,
/// `<type>s/<name>.<ext>` otherwise, where `<name>` is the id without a
/// leading `<type>-` prefix.
pub fn record_path(meta: &NodeMeta, extension: &str) -> String {
    let file_name = format!("{}.{}", file_stem(&meta.id), extension);
    let type_dir = meta.node_type.dir_name();

    if meta.node_type.nests_by_domain() {
        format!("{}/{}/{}", type_dir, domain_dir(&meta.domain), file_name)
    } else {
        format!("{}/{}", type_dir, file_name)
    }
}

fn file_stem(id: &str) -> &str {
    NodeType::ALL
        .iter()
        .find_map(|t| id.strip_prefix(t.as_str())?.strip_prefix('-'))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(id)
}

fn domain_dir(domain: &str) -> String {
    let dir: String = domain
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if dir.is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        dir
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, node_type: NodeType, domain: &str) -> NodeMeta {
        NodeMeta {
            id: id.into(),
            node_type,
            title: id.into(),
            domain: domain.into(),
            tags: vec![],
            status: STATUS_ACTIVE.into(),
            confidence: DEFAULT_CONFIDENCE.into(),
            created: String::new(),
            updated: String::new(),
            connections: vec![],
        }
    }

    #[test]
    fn test_record_path_nests_skills_and_tools_by_domain() {
        assert_eq!(
            record_path(&meta("skill-webhook-retries", NodeType::Skill, "n8n"), "md"),
            "skills/n8n/webhook-retries.md"
        );
        assert_eq!(
            record_path(&meta("tool-curl", NodeType::Tool, "Dev Ops/CLI"), "md"),
            "tools/dev-ops-cli/curl.md"
        );
        assert_eq!(
            record_path(&meta("lesson-timeouts", NodeType::Lesson, "n8n"), "md"),
            "lessons/timeouts.md"
        );
    }

    #[test]
    fn test_file_stem_strips_any_type_prefix() {
        assert_eq!(file_stem("concept-idempotency"), "idempotency");
        // The stripped prefix need not match the node's own type.
        assert_eq!(file_stem("project-x"), "x");
        assert_eq!(file_stem("skillful"), "skillful");
        assert_eq!(file_stem("skill-"), "skill-");
    }

    #[test]
    fn test_domain_dir_falls_back() {
        assert_eq!(domain_dir(""), DEFAULT_DOMAIN);
        assert_eq!(domain_dir("AI & ML"), "ai---ml");
    }

    #[test]
    fn test_node_update_is_empty() {
        assert!(NodeUpdate::default().is_empty());
        let update = NodeUpdate {
            title: Some("x".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
