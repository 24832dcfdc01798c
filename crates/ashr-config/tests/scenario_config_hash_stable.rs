//! Layered config hashing is deterministic and independent of key order.

use ashr_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
calendar:
  recent_dates_limit: 90
resolver:
  cache_ttl_secs: 300
market:
  enabled: false
  source_url: "http://127.0.0.1:8000"
  symbols: ["sh000001", "sz399001"]
  period: "1"
"#;

const BASE_YAML_REORDERED: &str = r#"
market:
  period: "1"
  symbols: ["sh000001", "sz399001"]
  source_url: "http://127.0.0.1:8000"
  enabled: false
resolver:
  cache_ttl_secs: 300
calendar:
  recent_dates_limit: 90
"#;

const OVERLAY_YAML: &str = r#"
market:
  enabled: true
resolver:
  cache_ttl_secs: 60
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_wins_and_typed_view_follows() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let desk = loaded.desk().unwrap();
    assert!(desk.market.enabled);
    assert_eq!(desk.resolver.cache_ttl_secs, 60);
    // untouched by the overlay
    assert_eq!(desk.market.symbols, vec!["sh000001", "sz399001"]);
    assert_eq!(desk.calendar.recent_dates_limit, 90);
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn files_load_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let over = dir.path().join("local.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&over, OVERLAY_YAML).unwrap();

    let from_files = ashr_config::load_layered_yaml(&[
        base.to_str().unwrap(),
        over.to_str().unwrap(),
    ])
    .unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);
}

#[test]
fn missing_file_names_the_path() {
    let err = ashr_config::load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
}

#[test]
fn shipped_example_config_is_clean_and_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../config/desk.example.yaml");
    let path = path.to_string_lossy().to_string();
    let loaded = ashr_config::load_layered_yaml(&[path.as_str()]).unwrap();

    let report =
        ashr_config::report_unused_keys(&loaded.config_json, ashr_config::UnusedKeyPolicy::Fail)
            .unwrap();
    assert!(report.is_clean());
    assert_eq!(loaded.desk().unwrap(), ashr_config::DeskConfig::default());
}
