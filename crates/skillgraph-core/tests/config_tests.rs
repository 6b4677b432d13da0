use std::fs;
use std::path::PathBuf;

use skillgraph_core::config::{
    ConfigError, DEFAULT_API_KEY, DEFAULT_ARCHIVE_DIR, DEFAULT_CONTENT_OVERLAP_CAP, DEFAULT_PORT,
    DEFAULT_SUGGEST_LIMIT, DEFAULT_SUGGEST_MIN_SCORE, DEFAULT_VAULT_PATH,
};
use skillgraph_core::Config;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.vault.root, PathBuf::from(DEFAULT_VAULT_PATH));
    assert_eq!(config.vault.archive_dir, DEFAULT_ARCHIVE_DIR);
    assert_eq!(config.server.port, DEFAULT_PORT);
    assert_eq!(config.server.api_key_or_default(), DEFAULT_API_KEY);
    assert_eq!(config.suggest.min_score, DEFAULT_SUGGEST_MIN_SCORE);
    assert_eq!(config.suggest.limit, DEFAULT_SUGGEST_LIMIT);
    assert_eq!(config.suggest.content_overlap_cap, DEFAULT_CONTENT_OVERLAP_CAP);
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[vault]"));
    assert!(toml_str.contains("[server]"));
    assert!(toml_str.contains("[suggest]"));
    assert!(!toml_str.contains("api_key"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[vault]
root = "/srv/vault"
archive_dir = "attic"

[server]
port = 9000

[suggest]
min_score = 6
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.vault.root, PathBuf::from("/srv/vault"));
    assert_eq!(config.vault.archive_dir, "attic");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.suggest.min_score, 6);
    // Unset keys keep their defaults.
    assert_eq!(config.suggest.limit, DEFAULT_SUGGEST_LIMIT);
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("skillgraph.toml");
    fs::write(&path, "[suggest]\nlimit = 0\n").unwrap();

    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_from_file_reports_parse_errors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("skillgraph.toml");
    fs::write(&path, "[vault\nroot = 1").unwrap();

    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_from_file_missing() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        Config::from_file(temp.path().join("nope.toml")),
        Err(ConfigError::ReadError(_))
    ));
}

#[test]
fn test_overrides_from_lookup() {
    let mut config = Config::default();
    config.apply_overrides(|key| match key {
        "VAULT_PATH" => Some("/legacy".to_string()),
        "SKILLGRAPH_ARCHIVE_DIR" => Some("old".to_string()),
        "SKILLGRAPH_PORT" => Some("4000".to_string()),
        "PORT" => Some("5000".to_string()),
        "SKILLGRAPH_SUGGEST_MIN_SCORE" => Some("3".to_string()),
        _ => None,
    });

    assert_eq!(config.vault.root, PathBuf::from("/legacy"));
    assert_eq!(config.vault.archive_dir, "old");
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.suggest.min_score, 3);
    assert!(config.server.uses_default_key());
}
