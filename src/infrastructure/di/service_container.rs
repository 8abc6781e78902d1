//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::application::services::{SchemaStore, StructuredDataService};
use crate::config::Settings;
use crate::domain::Capabilities;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::json_record::JsonRecord;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Named getters and predicates available to data-defined schemas
    pub capabilities: Capabilities,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Capabilities::new())
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        capabilities: Capabilities,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            capabilities,
        }
    }

    /// Schema store over the configured schema directory.
    pub fn schema_store(&self) -> SchemaStore {
        SchemaStore::with_capabilities(
            Arc::clone(&self.fs),
            self.settings.schema_dir.clone(),
            self.capabilities.clone(),
        )
    }

    /// Structured data service backed by the schema store.
    pub fn structured_data(&self) -> StructuredDataService {
        StructuredDataService::new(Arc::new(self.schema_store()))
    }

    /// Read a JSON record, optionally with a JSON object of related documents
    /// keyed by relation path.
    pub fn load_record(&self, record: &Path, relations: Option<&Path>) -> InfraResult<JsonRecord> {
        debug!("load_record: {}", record.display());
        let content = self
            .fs
            .read_to_string(record)
            .map_err(|e| InfraError::io(format!("read record {}", record.display()), e))?;
        let mut json_record = JsonRecord::from_json(&content)
            .map_err(|e| InfraError::record(record.display().to_string(), e))?;

        if let Some(relations) = relations {
            let content = self.fs.read_to_string(relations).map_err(|e| {
                InfraError::io(format!("read relations {}", relations.display()), e)
            })?;
            let related: BTreeMap<String, Value> = serde_json::from_str(&content)
                .map_err(|e| InfraError::record(relations.display().to_string(), e))?;
            json_record = json_record.with_relations(related);
        }

        Ok(json_record)
    }
}
