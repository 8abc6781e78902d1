//! Tests for layered Settings loading

use std::path::PathBuf;

use tempfile::TempDir;

use structured_data::config::{local_config_path, OutputFormat, Settings, DEFAULT_SCHEMA_DIR};

#[test]
fn given_no_local_config_when_loading_then_schema_dir_is_anchored_at_project() {
    // Arrange
    let temp = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(temp.path())).unwrap();

    // Assert
    if std::env::var_os("SDATA_SCHEMA_DIR").is_none() {
        assert!(settings.schema_dir.starts_with(temp.path()));
    }
}

#[test]
fn given_local_config_when_loading_then_overrides_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::write(
        local_config_path(temp.path()),
        r#"schema_dir = "schemas"

[output]
format = "tree"
pretty = false
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(temp.path())).unwrap();

    // Assert
    assert_eq!(settings.schema_dir, temp.path().join("schemas"));
    assert_eq!(settings.output.format, OutputFormat::Tree);
    assert!(!settings.output.pretty);
}

#[test]
fn given_absolute_schema_dir_when_loading_then_kept_as_is() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::write(
        local_config_path(temp.path()),
        "schema_dir = \"/srv/schemas\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(temp.path())).unwrap();

    // Assert
    assert_eq!(settings.schema_dir, PathBuf::from("/srv/schemas"));
}

#[test]
fn given_malformed_local_config_when_loading_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::write(local_config_path(temp.path()), "schema_dir = [\n").unwrap();

    // Act
    let result = Settings::load(Some(temp.path()));

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_template_when_parsed_then_is_valid_toml_with_defaults() {
    // Arrange
    let template = Settings::template();

    // Act
    let parsed: Settings = toml::from_str(&template).unwrap();

    // Assert
    assert_eq!(parsed.schema_dir, PathBuf::from(DEFAULT_SCHEMA_DIR));
    assert_eq!(parsed, Settings::default());
}

#[test]
fn given_settings_when_rendered_then_round_trips_through_toml() {
    // Arrange
    let settings = Settings::default();

    // Act
    let rendered = settings.to_toml().unwrap();

    // Assert
    let parsed: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, settings);
}
