//! Structured data service
//!
//! Loads a named schema, preloads the relations it declares and extracts the
//! output tree from a record.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{OutputNode, RecordAccessor, Schema, TreeExtractor};
use crate::infrastructure::traits::SchemaProvider;

/// Service for extracting structured views from records.
pub struct StructuredDataService {
    provider: Arc<dyn SchemaProvider>,
    extractor: TreeExtractor,
}

impl StructuredDataService {
    /// Create a new structured data service.
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            extractor: TreeExtractor::new(),
        }
    }

    /// Extract the view described by the schema registered as `schema_name`.
    ///
    /// Fails without partial output if loading, preloading or any getter,
    /// predicate or lookup fails.
    #[instrument(level = "debug", skip(self, record))]
    pub async fn get_data(
        &self,
        schema_name: &str,
        record: &dyn RecordAccessor,
    ) -> ApplicationResult<Vec<OutputNode>> {
        let schema = self.provider.load(schema_name)?;
        self.extract(&schema, record).await
    }

    /// Extract the view described by an already-resolved schema.
    pub async fn extract(
        &self,
        schema: &Schema,
        record: &dyn RecordAccessor,
    ) -> ApplicationResult<Vec<OutputNode>> {
        if !schema.populate().is_empty() {
            debug!("extract: preloading {:?}", schema.populate());
            record.preload(schema.populate()).await?;
        }
        let nodes = self.extractor.extract(schema, record).await?;
        debug!("extract: {} top-level nodes kept", nodes.len());
        Ok(nodes)
    }

    /// Names of all available schemas.
    pub fn list_schemas(&self) -> ApplicationResult<Vec<String>> {
        self.provider.list()
    }
}
