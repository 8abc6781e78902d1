//! Tests for SchemaStore

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use structured_data::application::services::SchemaStore;
use structured_data::application::ApplicationError;
use structured_data::domain::{Capabilities, DomainError, Getter, SchemaNode, ValueSource};
use structured_data::infrastructure::traits::{RealFileSystem, SchemaProvider};

/// Helper to create schema files for testing
fn create_schema_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write schema file");
    path
}

fn store(dir: &TempDir) -> SchemaStore {
    SchemaStore::new(Arc::new(RealFileSystem), dir.path())
}

#[test]
fn given_json_and_toml_with_same_name_when_locating_then_prefers_json() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let json_path = create_schema_file(&temp, "pet.json", r#"{"fields": []}"#);
    create_schema_file(&temp, "pet.toml", "fields = []\n");

    // Act
    let located = store(&temp).locate("pet").unwrap();

    // Assert
    assert_eq!(located, json_path);
}

#[test]
fn given_toml_schema_when_loading_then_resolves_nodes() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_schema_file(
        &temp,
        "pet.toml",
        r#"
[[fields]]
label = "Name"
path = "name"
"#,
    );

    // Act
    let schema = store(&temp).load("pet").unwrap();

    // Assert
    assert_eq!(schema.children().len(), 1);
    assert_eq!(schema.children()[0].label(), "Name");
}

#[test]
fn given_capabilities_when_loading_then_binds_getter_by_name() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_schema_file(
        &temp,
        "person.json",
        r#"{"fields": [{"label": "Name", "get": "fullName"}]}"#,
    );
    let mut caps = Capabilities::new();
    caps.register_getter(Getter::immediate("fullName", |_| Ok(Some(json!("Ada")))));
    let store = SchemaStore::with_capabilities(Arc::new(RealFileSystem), temp.path(), caps);

    // Act
    let schema = store.load("person").unwrap();

    // Assert
    assert!(matches!(
        &schema.children()[0],
        SchemaNode::Field(field) if matches!(&field.source, ValueSource::Getter(_))
    ));
}

#[test]
fn given_missing_schema_when_loading_then_not_found() {
    // Arrange
    let temp = TempDir::new().unwrap();

    // Act
    let result = store(&temp).load("ghost");

    // Assert
    assert!(matches!(result, Err(ApplicationError::SchemaNotFound { ref name, .. }) if name == "ghost"));
}

#[test]
fn given_malformed_document_when_loading_then_schema_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_schema_file(&temp, "broken.json", r#"{"fields": [{"label": "X"}]}"#);

    // Act
    let result = store(&temp).load("broken");

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::Schema { .. }))
    ));
}

#[test]
fn given_path_like_name_when_loading_then_rejects_name() {
    // Arrange
    let temp = TempDir::new().unwrap();

    // Act & Assert
    for name in ["", "../secret", "a/b", "a\\b", "."] {
        let result = store(&temp).load(name);
        assert!(
            matches!(result, Err(ApplicationError::InvalidSchemaName(_))),
            "name {name:?} should be rejected"
        );
    }
}

#[test]
fn given_schema_directory_when_listing_then_returns_sorted_unique_stems() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_schema_file(&temp, "zoo.json", "{}");
    create_schema_file(&temp, "pet.json", "{}");
    create_schema_file(&temp, "pet.toml", "");
    create_schema_file(&temp, "notes.md", "# not a schema");
    std::fs::create_dir(temp.path().join("nested.json")).unwrap();

    // Act
    let names = store(&temp).list().unwrap();

    // Assert
    assert_eq!(names, vec!["pet".to_string(), "zoo".to_string()]);
}

#[test]
fn given_missing_directory_when_listing_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let store = SchemaStore::new(Arc::new(RealFileSystem), temp.path().join("absent"));

    // Act
    let result = store.list();

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}
