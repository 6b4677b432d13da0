//! Fixed word lists used by the suggestion scorer.

/// High-frequency words that say nothing about a node's subject.
///
/// Only words longer than [`crate::config::MIN_TOKEN_LENGTH`] need listing.
pub const STOP_WORDS: &[&str] = &[
    // English function words
    "about", "after", "again", "also", "because", "been", "before", "being", "between", "both",
    "could", "does", "doing", "done", "down", "during", "each", "from", "further", "have",
    "having", "here", "into", "just", "like", "more", "most", "much", "must", "only", "other",
    "over", "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "very", "were", "what",
    "when", "where", "which", "while", "will", "with", "would", "your", // Vault vocabulary
    "node", "nodes", "workflow", "workflows", "note", "notes", "file", "files", "thing", "things",
    "example", "examples", "using", "used", "make", "makes", "need", "needs", "want", "good",
    "better", "best", "work", "works",
];

/// Tags too common across the vault to count as shared subject matter.
pub const GENERIC_TAGS: &[&str] = &[
    "n8n",
    "automation",
    "workflow",
    "workflows",
    "general",
    "misc",
    "notes",
    "todo",
    "ideas",
    "learning",
    "skillgraph",
    "dev",
    "ai",
];

/// Whether `word` (already lowercased) is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Whether `tag` (already lowercased) is a generic tag.
pub fn is_generic_tag(tag: &str) -> bool {
    GENERIC_TAGS.contains(&tag)
}
