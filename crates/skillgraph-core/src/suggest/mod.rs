//! Connection suggestions for a draft node.
//!
//! Scoring is a token-overlap heuristic against every indexed node:
//!
//! | signal                                         | points        |
//! |------------------------------------------------|---------------|
//! | candidate title token in draft title           | +4 each       |
//! | candidate title token elsewhere in the draft   | +2 each       |
//! | candidate content tokens found in the draft    | +1 each, capped |
//! | shared non-generic tag                         | +3 each       |
//! | same domain                                    | +1            |
//!
//! Candidates must clear [`SuggestConfig::min_score`] to be returned.

mod vocabulary;

pub use vocabulary::{is_generic_tag, is_stop_word, GENERIC_TAGS, STOP_WORDS};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{SuggestConfig, MIN_TOKEN_LENGTH};
use crate::index::VaultIndex;
use crate::models::{EdgeType, Node, NodeType};

/// A node that has not been written yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: String,
}

/// A proposed connection from a draft to an indexed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub domain: String,
    pub score: u32,
    pub suggested_edge: EdgeType,
}

/// Lowercased words longer than [`MIN_TOKEN_LENGTH`], stop words removed.
///
/// Words are split on every character that is neither alphanumeric nor `-`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|t| t.chars().count() > MIN_TOKEN_LENGTH)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Token sets for one draft, built once and reused across candidates.
struct DraftTokens {
    title: HashSet<String>,
    all: HashSet<String>,
    tags: HashSet<String>,
}

impl DraftTokens {
    fn new(draft: &Draft) -> Self {
        let title: HashSet<String> = tokenize(&draft.title).into_iter().collect();
        let mut all = title.clone();
        all.extend(tokenize(&draft.tags.join(" ")));
        all.extend(tokenize(&draft.content));

        Self {
            title,
            all,
            tags: draft.tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }
}

/// Score one candidate against a draft.
fn score_candidate(draft: &Draft, tokens: &DraftTokens, node: &Node, config: &SuggestConfig) -> u32 {
    let mut score = 0u32;

    let title_tokens: HashSet<String> = tokenize(&node.meta.title).into_iter().collect();
    for token in &title_tokens {
        if tokens.title.contains(token) {
            score += 4;
        } else if tokens.all.contains(token) {
            score += 2;
        }
    }

    let content_tokens: HashSet<String> = tokenize(&node.content).into_iter().collect();
    let content_overlap = content_tokens
        .iter()
        .filter(|t| tokens.all.contains(*t))
        .count() as u32;
    score += content_overlap.min(config.content_overlap_cap);

    let shared_tags = node
        .meta
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|t| tokens.tags.contains(t) && !is_generic_tag(t))
        .count() as u32;
    score += shared_tags * 3;

    if node.meta.domain == draft.domain {
        score += 1;
    }

    score
}

/// Rank `nodes` as connection targets for `draft`.
///
/// Returns at most `config.limit` suggestions scoring above
/// `config.min_score`, best first. Ties keep the order of `nodes`.
pub fn suggest_connections<'a>(
    draft: &Draft,
    nodes: impl IntoIterator<Item = &'a Node>,
    config: &SuggestConfig,
) -> Vec<Suggestion> {
    let tokens = DraftTokens::new(draft);

    let mut suggestions: Vec<Suggestion> = nodes
        .into_iter()
        .filter_map(|node| {
            let score = score_candidate(draft, &tokens, node, config);
            (score > config.min_score).then(|| Suggestion {
                id: node.meta.id.clone(),
                title: node.meta.title.clone(),
                node_type: node.meta.node_type,
                domain: node.meta.domain.clone(),
                score,
                suggested_edge: node.meta.node_type.suggested_edge(),
            })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions.truncate(config.limit);
    suggestions
}

impl VaultIndex {
    /// Suggestions for `draft` against every indexed node.
    pub fn suggest_connections(&self, draft: &Draft, config: &SuggestConfig) -> Vec<Suggestion> {
        suggest_connections(draft, self.iter(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeMeta;

    fn candidate(id: &str, node_type: NodeType, title: &str, tags: &[&str], content: &str) -> Node {
        Node {
            meta: NodeMeta {
                id: id.into(),
                node_type,
                title: title.into(),
                domain: "n8n".into(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                status: "active".into(),
                confidence: "medium".into(),
                created: String::new(),
                updated: String::new(),
                connections: vec![],
            },
            content: content.into(),
            raw: String::new(),
            file_path: format!("{id}.md"),
        }
    }

    fn score(draft: &Draft, node: &Node) -> u32 {
        score_candidate(draft, &DraftTokens::new(draft), node, &SuggestConfig::default())
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("The Webhook-Retry pattern, with n8n & APIs!"),
            vec!["webhook-retry", "pattern", "apis"]
        );
        assert!(tokenize("a an the and").is_empty());
    }

    #[test]
    fn test_title_overlap_scores_once_per_token() {
        let draft = Draft {
            title: "Webhook Retry Retry".into(),
            ..Default::default()
        };
        let node = candidate("x", NodeType::Lesson, "Retry webhook", &[], "");
        assert_eq!(score(&draft, &node), 8);
    }

    #[test]
    fn test_body_overlap_is_weaker_than_title_overlap() {
        let draft = Draft {
            title: "Unrelated".into(),
            content: "webhook".into(),
            ..Default::default()
        };
        let node = candidate("x", NodeType::Lesson, "Webhook", &[], "");
        assert_eq!(score(&draft, &node), 2);
    }

    #[test]
    fn test_content_overlap_is_capped() {
        let words = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let draft = Draft {
            title: "Unrelated".into(),
            content: words.into(),
            ..Default::default()
        };
        let node = candidate("x", NodeType::Lesson, "Other", &[], words);
        assert_eq!(score(&draft, &node), crate::config::DEFAULT_CONTENT_OVERLAP_CAP);
    }

    #[test]
    fn test_generic_tags_do_not_count() {
        let draft = Draft {
            title: "Unrelated".into(),
            tags: vec!["N8N".into(), "Webhooks".into()],
            ..Default::default()
        };
        let node = candidate("x", NodeType::Lesson, "Other", &["n8n", "webhooks"], "");
        assert_eq!(score(&draft, &node), 3);
    }

    #[test]
    fn test_domain_match_adds_one() {
        let draft = Draft {
            title: "Unrelated".into(),
            domain: "n8n".into(),
            ..Default::default()
        };
        let node = candidate("x", NodeType::Lesson, "Other", &[], "");
        assert_eq!(score(&draft, &node), 1);
    }

    #[test]
    fn test_sorted_and_limited() {
        let nodes: Vec<Node> = (0..8)
            .map(|i| {
                let title = if i % 2 == 0 {
                    "Webhook Retry Backoff"
                } else {
                    "Webhook Retry"
                };
                candidate(&format!("n{i}"), NodeType::Tool, title, &[], "")
            })
            .collect();
        let draft = Draft {
            title: "Webhook Retry Backoff".into(),
            domain: "n8n".into(),
            ..Default::default()
        };

        let found = suggest_connections(&draft, &nodes, &SuggestConfig::default());
        let ids: Vec<_> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["n0", "n2", "n4", "n6", "n1"]);
        assert_eq!(found[0].score, 13);
        assert_eq!(found[4].score, 9);
        assert_eq!(found[0].suggested_edge, EdgeType::Uses);
    }
}
