//! Default values for SkillGraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Vault Defaults
// ============================================================================

/// Vault root, relative to the working directory.
pub const DEFAULT_VAULT_PATH: &str = "../vault";

/// Directory (under the vault root) that receives archived records.
pub const DEFAULT_ARCHIVE_DIR: &str = "archive";

/// Extension of record files, without the leading dot.
pub const RECORD_EXTENSION: &str = "md";

// ============================================================================
// Record Header Defaults
// ============================================================================

/// Domain used when a header has none.
pub const DEFAULT_DOMAIN: &str = "uncategorized";

/// Confidence used when a header has none.
pub const DEFAULT_CONFIDENCE: &str = "medium";

// ============================================================================
// Server Defaults
// ============================================================================

/// Address the REST server binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Port the REST server listens on.
pub const DEFAULT_PORT: u16 = 3456;

/// Development API key. Override with `SG_API_KEY` in any shared deployment.
pub const DEFAULT_API_KEY: &str = "sk_sg_dev_key_change_me";

/// Page size for search and changelog when the caller gives none.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on any requested page size.
pub const MAX_PAGE_SIZE: usize = 50;

/// Length of the content snippet returned with search hits.
pub const SNIPPET_LENGTH: usize = 200;

// ============================================================================
// Suggestion Defaults
// ============================================================================

/// Candidates must score strictly above this to be suggested.
pub const DEFAULT_SUGGEST_MIN_SCORE: u32 = 8;

/// Maximum number of suggestions returned.
pub const DEFAULT_SUGGEST_LIMIT: usize = 5;

/// Cap on the content-overlap contribution to a candidate's score.
pub const DEFAULT_CONTENT_OVERLAP_CAP: u32 = 6;

/// Tokens must be longer than this many characters to count.
pub const MIN_TOKEN_LENGTH: usize = 3;

// ============================================================================
// Ingestion Defaults
// ============================================================================

/// Auto-connect keeps suggestions scoring strictly above this.
pub const AUTO_CONNECT_MIN_SCORE: u32 = 4;

/// Auto-connect keeps at most this many suggestions.
pub const AUTO_CONNECT_LIMIT: usize = 3;

/// Maximum slug length for ids generated by `/ingest`.
pub const INGEST_SLUG_MAX_LEN: usize = 60;

/// Maximum slug length for ids generated by the n8n webhook.
pub const WEBHOOK_SLUG_MAX_LEN: usize = 40;
