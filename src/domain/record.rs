//! Record access boundary consumed by the extractor and by capabilities.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::DomainResult;

/// Read-only view of a data record.
///
/// `get` returns `Ok(None)` when the path does not resolve ("absent"), which is
/// distinct from an explicit `Value::Null`.
#[async_trait]
pub trait RecordAccessor: Send + Sync {
    /// Resolve a dotted path to a value.
    async fn get(&self, path: &str) -> DomainResult<Option<Value>>;

    /// Load related data before extraction starts.
    ///
    /// Called at most once per extraction, before the walk begins.
    async fn preload(&self, relations: &[String]) -> DomainResult<()> {
        let _ = relations;
        Ok(())
    }
}
