use resolved_graph::config::*;
use resolved_graph::GraphError;
use tempfile::TempDir;

#[test]
fn test_default_config_field_names() {
    let config = GraphConfig::default();
    assert_eq!(config.version, 1);
    assert_eq!(config.outgoing_field, DEFAULT_OUTGOING_FIELD);
    assert_eq!(config.incoming_field, DEFAULT_INCOMING_FIELD);
    assert!(!config.warn_on_dangling);
    assert!(config.is_derived_node_field("outgoingLinks"));
    assert!(!config.is_derived_node_field("data"));
}

#[test]
fn test_save_and_load_config() {
    let dir = TempDir::new().unwrap();
    let config = GraphConfig {
        outgoing_field: "from".to_string(),
        incoming_field: "to".to_string(),
        warn_on_dangling: true,
        ..GraphConfig::default()
    };
    save_config(dir.path(), &config).unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(config, loaded);
    assert!(!get_config_path(dir.path()).with_extension("tmp").exists());
}

#[test]
fn test_missing_config_is_default() {
    let dir = TempDir::new().unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert_eq!(loaded, GraphConfig::default());
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        get_config_path(dir.path()),
        r#"{ "warn_on_dangling": true }"#,
    )
    .unwrap();
    let loaded = load_config(dir.path()).unwrap();
    assert!(loaded.warn_on_dangling);
    assert_eq!(loaded.outgoing_field, DEFAULT_OUTGOING_FIELD);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        get_config_path(dir.path()),
        r#"{ "outgoing_field": "links", "incoming_field": "links" }"#,
    )
    .unwrap();
    assert!(matches!(
        load_config(dir.path()),
        Err(GraphError::Config { .. })
    ));

    std::fs::write(get_config_path(dir.path()), "not json").unwrap();
    assert!(load_config(dir.path()).is_err());

    let bad = GraphConfig {
        incoming_field: String::new(),
        ..GraphConfig::default()
    };
    assert!(save_config(dir.path(), &bad).is_err());
}

#[test]
fn test_reserved_field_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        get_config_path(dir.path()),
        r#"{ "outgoing_field": "data" }"#,
    )
    .unwrap();
    assert!(matches!(
        load_config(dir.path()),
        Err(GraphError::Config { .. })
    ));

    let shadows_id = GraphConfig {
        incoming_field: "id".to_string(),
        ..GraphConfig::default()
    };
    assert!(matches!(
        shadows_id.validate(),
        Err(GraphError::Config { .. })
    ));
    assert!(save_config(dir.path(), &shadows_id).is_err());
    assert!(!get_config_path(dir.path()).with_extension("tmp").exists());
}

#[test]
fn test_config_path() {
    let dir = TempDir::new().unwrap();
    assert!(get_config_path(dir.path()).ends_with(CONFIG_FILENAME));
}

#[test]
fn test_config_serde_roundtrip() {
    let config = GraphConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let deserialized: GraphConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}
