//! Tests for configuration defaults, validation and file loading.

use crate::config::RecoConfig;
use std::io::Write;

#[test]
fn test_defaults_are_valid() {
    let config = RecoConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.num_segments, 5);
    assert_eq!(config.items_per_page, 20);
    assert_eq!(config.blend.weight_demographic, 1);
    assert_eq!(config.blend.weight_content, 2);
    assert_eq!(config.blend.weight_collaborative, 3);
    assert!(config.blend.enable_collaborative);
    assert_eq!(config.collab.rating_scale, (1.0, 5.0));
}

#[test]
fn test_validation_rejects_zero_segments() {
    let config = RecoConfig {
        num_segments: 0,
        ..RecoConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("num_segments"));
}

#[test]
fn test_validation_rejects_zero_page_size() {
    let config = RecoConfig {
        items_per_page: 0,
        ..RecoConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_inverted_rating_scale() {
    let mut config = RecoConfig::default();
    config.collab.rating_scale = (5.0, 1.0);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("rating_scale"));
}

#[test]
fn test_validation_rejects_all_zero_primary_weights() {
    let mut config = RecoConfig::default();
    config.blend.weight_demographic = 0;
    config.blend.weight_content = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = RecoConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.num_segments, RecoConfig::default().num_segments);
}

#[test]
fn test_load_toml_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bazaari.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "num_segments = 3\nitems_per_page = 8\n\n[blend]\nweight_content = 4\nenable_collaborative = false\n"
    )
    .unwrap();

    let config = RecoConfig::load(&path).unwrap();
    assert_eq!(config.num_segments, 3);
    assert_eq!(config.items_per_page, 8);
    assert_eq!(config.blend.weight_content, 4);
    assert!(!config.blend.enable_collaborative);
    // Untouched options keep their defaults.
    assert_eq!(config.blend.weight_demographic, 1);
    assert_eq!(config.collab.latent_factors, 32);
}

#[test]
fn test_round_trip_through_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bazaari.toml");
    let mut config = RecoConfig::default();
    config.num_segments = 4;
    config.collab.epochs = 5;
    std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = RecoConfig::load(&path).unwrap();
    assert_eq!(loaded.num_segments, 4);
    assert_eq!(loaded.collab.epochs, 5);
    assert_eq!(loaded.items_per_page, config.items_per_page);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bazaari.toml");
    std::fs::write(&path, "num_segments = 0\n").unwrap();
    assert!(RecoConfig::load(&path).is_err());
}
