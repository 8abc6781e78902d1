//! Tests for StructuredDataService

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use structured_data::application::services::{SchemaStore, StructuredDataService};
use structured_data::application::{ApplicationError, ApplicationResult};
use structured_data::domain::{
    DomainError, DomainResult, FieldNode, GroupNode, OutputNode, RecordAccessor, Schema,
};
use structured_data::infrastructure::traits::{RealFileSystem, SchemaProvider};
use structured_data::infrastructure::JsonRecord;

/// In-memory schema provider
struct MemoryProvider {
    schemas: HashMap<String, Schema>,
}

impl SchemaProvider for MemoryProvider {
    fn load(&self, name: &str) -> ApplicationResult<Schema> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| ApplicationError::SchemaNotFound {
                name: name.to_string(),
                dir: "<memory>".into(),
            })
    }

    fn list(&self) -> ApplicationResult<Vec<String>> {
        let mut names: Vec<_> = self.schemas.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Record that remembers preload calls and fails lookups made before preload.
struct RecordingAccessor {
    inner: JsonRecord,
    preloaded: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl RecordAccessor for RecordingAccessor {
    async fn get(&self, path: &str) -> DomainResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn preload(&self, relations: &[String]) -> DomainResult<()> {
        self.preloaded.lock().unwrap().push(relations.to_vec());
        self.inner.preload(relations).await
    }
}

fn service(schemas: Vec<(&str, Schema)>) -> StructuredDataService {
    let provider = MemoryProvider {
        schemas: schemas
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };
    StructuredDataService::new(Arc::new(provider))
}

fn pet_schema() -> Schema {
    Schema::builder()
        .populate("owner")
        .group(
            GroupNode::new("Pet")
                .field(FieldNode::path("Name", "name"))
                .field(FieldNode::path("Owner", "owner.name")),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn given_schema_with_populate_when_getting_data_then_preloads_before_extracting() {
    // Arrange
    let service = service(vec![("pet", pet_schema())]);
    let record = RecordingAccessor {
        inner: JsonRecord::new(json!({"name": "Rex", "owner": "user-1"}))
            .with_relation("owner", json!({"name": "Ada"})),
        preloaded: Mutex::new(Vec::new()),
    };

    // Act
    let nodes = service.get_data("pet", &record).await.unwrap();

    // Assert
    assert_eq!(*record.preloaded.lock().unwrap(), vec![vec!["owner".to_string()]]);
    assert_eq!(nodes[0].data()[1].display(), Some(&json!("Ada")));
}

#[tokio::test]
async fn given_schema_without_populate_when_extracting_then_skips_preload() {
    // Arrange
    let schema = Schema::builder()
        .field(FieldNode::path("Name", "name"))
        .build()
        .unwrap();
    let service = service(vec![]);
    let record = RecordingAccessor {
        inner: JsonRecord::new(json!({"name": "Rex"})),
        preloaded: Mutex::new(Vec::new()),
    };

    // Act
    let nodes = service.extract(&schema, &record).await.unwrap();

    // Assert
    assert!(record.preloaded.lock().unwrap().is_empty());
    assert_eq!(nodes.len(), 1);
}

#[tokio::test]
async fn given_failing_preload_when_getting_data_then_no_output_is_produced() {
    // Arrange
    let service = service(vec![("pet", pet_schema())]);
    let record = JsonRecord::new(json!({"name": "Rex", "owner": "user-1"}));

    // Act
    let result = service.get_data("pet", &record).await;

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::Preload { .. }))
    ));
}

#[tokio::test]
async fn given_unknown_schema_when_getting_data_then_not_found() {
    // Arrange
    let service = service(vec![]);
    let record = JsonRecord::new(json!({}));

    // Act
    let result = service.get_data("ghost", &record).await;

    // Assert
    assert!(matches!(result, Err(ApplicationError::SchemaNotFound { .. })));
}

#[test]
fn given_provider_when_listing_schemas_then_delegates() {
    // Arrange
    let service = service(vec![("zoo", pet_schema()), ("pet", pet_schema())]);

    // Act
    let names = service.list_schemas().unwrap();

    // Assert
    assert_eq!(names, vec!["pet".to_string(), "zoo".to_string()]);
}

#[tokio::test]
async fn given_schema_file_when_getting_data_then_serializes_output_contract() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("person.json"),
        r#"{"groups": [
            {"label": "Basics", "fields": [
                {"label": "Name", "path": "name"},
                {"label": "Status", "path": "status", "valueMap": {"1": "Active", "0": "Inactive"}}
            ]},
            {"label": "Extra", "fields": [{"label": "Nickname", "path": "nickname"}]}
        ]}"#,
    )
    .unwrap();
    let store = SchemaStore::new(Arc::new(RealFileSystem), temp.path());
    let service = StructuredDataService::new(Arc::new(store));
    let record = JsonRecord::new(json!({"name": "Ada", "status": 0}));

    // Act
    let nodes = service.get_data("person", &record).await.unwrap();

    // Assert
    let round_trip: Vec<OutputNode> =
        serde_json::from_value(serde_json::to_value(&nodes).unwrap()).unwrap();
    assert_eq!(round_trip, nodes);
    assert_eq!(
        serde_json::to_value(&nodes).unwrap(),
        json!([{"type": "group", "label": "Basics", "data": [
            {"type": "field", "label": "Name", "value": "Ada", "display": "Ada", "path": "name"},
            {"type": "field", "label": "Status", "value": 0, "display": "Inactive", "path": "status"}
        ]}])
    );
}
