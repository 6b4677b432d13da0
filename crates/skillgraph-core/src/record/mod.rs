//! Record codec: markdown files with a YAML front-matter header.
//!
//! ```text
//! ---
//! id: skill-webhook-retries
//! type: skill
//! title: Webhook Retries
//! ...
//! ---
//! Body in markdown.
//! ```
//!
//! [`decode`] turns file text into a typed [`NodeMeta`] plus body, applying the
//! coercion rules in [`coerce`]. [`encode`] writes the header back in a fixed
//! key order followed by the body.

mod coerce;
mod frontmatter;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::models::NodeMeta;

/// Why a file could not be turned into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The YAML header is not valid YAML.
    #[error("Malformed front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An opening `---` line has no matching closing line.
    #[error("Unterminated front matter")]
    UnterminatedFrontMatter,

    /// `id` or `type` is absent or empty.
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    /// `type` is not one of the known node types.
    #[error("Unknown node type: {0}")]
    UnknownType(String),
}

impl RecordError {
    /// True for syntax failures, false for semantically invalid headers.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, RecordError::Yaml(_) | RecordError::UnterminatedFrontMatter)
    }
}

/// A decoded record: coerced header plus trimmed body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub meta: NodeMeta,
    pub body: String,
}

/// Parse file text into a header and body.
pub fn decode(raw: &str) -> Result<DecodedRecord, RecordError> {
    let (header, body) = match frontmatter::split(raw)? {
        Some((yaml, body)) => (parse_header(yaml)?, body),
        None => (Mapping::new(), raw),
    };

    let meta = coerce::meta_from_header(&header)?;

    Ok(DecodedRecord {
        meta,
        body: body.trim().to_string(),
    })
}

/// Serialize a header and body into file text.
pub fn encode(body: &str, meta: &NodeMeta) -> Result<String, RecordError> {
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("---\n{}---\n{}\n", yaml, body.trim_end_matches('\n')))
}

fn parse_header(yaml: &str) -> Result<Mapping, RecordError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(map),
        // A scalar or list header carries no fields; the mandatory-field
        // check reports it.
        _ => Ok(Mapping::new()),
    }
}
