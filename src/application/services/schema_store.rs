//! File-backed schema store
//!
//! Resolves schema names to JSON or TOML documents inside a schema directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Capabilities, Schema, SchemaDefinition};
use crate::infrastructure::traits::{FileSystem, SchemaProvider};

/// Supported document extensions, in lookup order.
const SCHEMA_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Loads schema documents from `<schema_dir>/<name>.{json,toml}`.
pub struct SchemaStore {
    fs: Arc<dyn FileSystem>,
    schema_dir: PathBuf,
    capabilities: Capabilities,
}

impl SchemaStore {
    /// Create a store over `schema_dir` with no registered capabilities.
    pub fn new(fs: Arc<dyn FileSystem>, schema_dir: impl Into<PathBuf>) -> Self {
        Self::with_capabilities(fs, schema_dir, Capabilities::new())
    }

    /// Create a store that binds getter/predicate names against `capabilities`.
    pub fn with_capabilities(
        fs: Arc<dyn FileSystem>,
        schema_dir: impl Into<PathBuf>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            fs,
            schema_dir: schema_dir.into(),
            capabilities,
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Find the document for `name`, preferring JSON over TOML.
    pub fn locate(&self, name: &str) -> ApplicationResult<PathBuf> {
        validate_name(name)?;
        SCHEMA_EXTENSIONS
            .iter()
            .map(|ext| self.schema_dir.join(format!("{name}.{ext}")))
            .find(|candidate| self.fs.is_file(candidate))
            .ok_or_else(|| ApplicationError::SchemaNotFound {
                name: name.to_string(),
                dir: self.schema_dir.clone(),
            })
    }

    /// Read and parse the document for `name` without resolving capabilities.
    #[instrument(level = "debug", skip(self))]
    pub fn load_definition(&self, name: &str) -> ApplicationResult<SchemaDefinition> {
        let path = self.locate(name)?;
        debug!("load_definition: {}", path.display());
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read schema", &path)?;
        let definition = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => SchemaDefinition::from_toml(&content)?,
            _ => SchemaDefinition::from_json(&content)?,
        };
        Ok(definition)
    }
}

impl SchemaProvider for SchemaStore {
    fn load(&self, name: &str) -> ApplicationResult<Schema> {
        let definition = self.load_definition(name)?;
        Ok(definition.resolve(&self.capabilities)?)
    }

    fn list(&self) -> ApplicationResult<Vec<String>> {
        if !self.fs.is_dir(&self.schema_dir) {
            return Err(ApplicationError::Config {
                message: format!(
                    "schema directory does not exist: {}",
                    self.schema_dir.display()
                ),
            });
        }
        let files = self
            .fs
            .list_files(&self.schema_dir)
            .with_path_context("list schemas", &self.schema_dir)?;
        let names = files
            .iter()
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext))
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect();
        Ok(names)
    }
}

/// Schema names are bare file stems: no separators, no parent references.
fn validate_name(name: &str) -> ApplicationResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\');
    if bad {
        Err(ApplicationError::InvalidSchemaName(name.to_string()))
    } else {
        Ok(())
    }
}
