//! Coercion of loosely-shaped header values into a typed [`NodeMeta`].
//!
//! Hand-edited headers arrive in many shapes: numbers where strings were
//! meant, tags as one comma-joined string, connection entries missing keys.
//! Everything is normalized here so nothing past the codec sees raw YAML.

use serde_yaml::{Mapping, Value};

use super::RecordError;
use crate::config::{DEFAULT_CONFIDENCE, DEFAULT_DOMAIN};
use crate::models::{Connection, EdgeType, NodeMeta, NodeType, STATUS_ACTIVE};

pub(super) fn meta_from_header(header: &Mapping) -> Result<NodeMeta, RecordError> {
    let field = |key: &str| scalar(header.get(key));

    let id = field("id").ok_or(RecordError::MissingField("id"))?;
    let node_type = field("type")
        .ok_or(RecordError::MissingField("type"))?
        .parse::<NodeType>()
        .map_err(|e| RecordError::UnknownType(e.0))?;

    Ok(NodeMeta {
        title: field("title").unwrap_or_else(|| id.clone()),
        domain: field("domain").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        tags: tags(header.get("tags")),
        status: field("status").unwrap_or_else(|| STATUS_ACTIVE.to_string()),
        confidence: field("confidence").unwrap_or_else(|| DEFAULT_CONFIDENCE.to_string()),
        created: field("created").unwrap_or_default(),
        updated: field("updated").unwrap_or_default(),
        connections: connections(header.get("connections")),
        id,
        node_type,
    })
}

/// Stringify a scalar. Null, empty strings, and collections count as absent.
fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar(Some(&tagged.value)),
        _ => None,
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => {
            let items: Vec<String> = items.iter().filter_map(|v| scalar(Some(v))).collect();
            if let [only] = items.as_slice() {
                if only.contains(',') {
                    return split_tag_list(only);
                }
            }
            items
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        }
        other => scalar(other)
            .map(|s| split_tag_list(&s))
            .unwrap_or_default(),
    }
}

/// Split `"[a, b]"` or `"a, b"` into trimmed, unquoted, non-empty pieces.
fn split_tag_list(list: &str) -> Vec<String> {
    let inner = list.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    inner
        .split(',')
        .map(|piece| piece.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn connections(value: Option<&Value>) -> Vec<Connection> {
    let Some(Value::Sequence(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| Connection {
            target: scalar(item.get("target")).unwrap_or_default(),
            edge: scalar(item.get("edge"))
                .map(EdgeType::from)
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_scalars_are_stringified() {
        let meta = meta_from_header(&header("id: 42\ntype: tool\ntitle: 3.5\nconfidence: true")).unwrap();
        assert_eq!(meta.id, "42");
        assert_eq!(meta.title, "3.5");
        assert_eq!(meta.confidence, "true");
    }

    #[test]
    fn test_empty_and_null_fall_back_to_defaults() {
        let meta = meta_from_header(&header("id: a\ntype: lesson\ntitle: ''\ndomain: ~")).unwrap();
        assert_eq!(meta.title, "a");
        assert_eq!(meta.domain, DEFAULT_DOMAIN);

        let err = meta_from_header(&header("id: ''\ntype: lesson")).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("id")));
    }

    #[test]
    fn test_tags_sequence_kept() {
        assert_eq!(
            tags(Some(&serde_yaml::from_str::<Value>("[alpha, ' beta ', '']").unwrap())),
            vec!["alpha", "beta"]
        );
    }

    #[test]
    fn test_tags_single_comma_element_is_split() {
        assert_eq!(
            tags(Some(&serde_yaml::from_str::<Value>("['[a, b, c]']").unwrap())),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_tags_bracketed_string_is_split() {
        assert_eq!(
            tags(Some(&Value::String("[\"x\", 'y', , z]".into()))),
            vec!["x", "y", "z"]
        );
    }

    #[test]
    fn test_tags_other_shapes() {
        assert!(tags(None).is_empty());
        assert!(tags(Some(&Value::Null)).is_empty());
        assert_eq!(tags(Some(&Value::String("solo".into()))), vec!["solo"]);
    }

    #[test]
    fn test_connection_defaults() {
        let conns = connections(Some(
            &serde_yaml::from_str::<Value>("[{target: b}, {edge: uses}, plain, {target: c, edge: part_of}]")
                .unwrap(),
        ));
        assert_eq!(
            conns,
            vec![
                Connection::new("b", EdgeType::RelatedTo),
                Connection::new("", EdgeType::Uses),
                Connection::new("", EdgeType::RelatedTo),
                Connection::new("c", EdgeType::PartOf),
            ]
        );
    }
}
