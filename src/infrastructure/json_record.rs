//! JSON document record accessor
//!
//! Resolves dotted paths through objects (by key) and arrays (by index).
//! Related documents can be attached up front and are swapped in at their
//! relation path by `preload`, the way a document store populates references.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::{DomainError, DomainResult, RecordAccessor};

/// Record backed by a `serde_json::Value` document.
#[derive(Debug)]
pub struct JsonRecord {
    document: RwLock<Value>,
    relations: BTreeMap<String, Value>,
}

impl JsonRecord {
    pub fn new(document: Value) -> Self {
        Self {
            document: RwLock::new(document),
            relations: BTreeMap::new(),
        }
    }

    /// Parse a record from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    /// Attach a related document to be populated at `relation` on preload.
    pub fn with_relation(mut self, relation: impl Into<String>, related: Value) -> Self {
        self.relations.insert(relation.into(), related);
        self
    }

    /// Attach several related documents keyed by relation path.
    pub fn with_relations(mut self, relations: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.relations.extend(relations);
        self
    }

    /// Copy of the current document, including any preloaded relations.
    pub fn snapshot(&self) -> DomainResult<Value> {
        let document = self
            .document
            .read()
            .map_err(|_| DomainError::accessor("<root>", "record lock poisoned"))?;
        Ok(document.clone())
    }

    fn read_path(&self, path: &str) -> DomainResult<Option<Value>> {
        let segments = split_path(path)?;
        let document = self
            .document
            .read()
            .map_err(|_| DomainError::accessor(path, "record lock poisoned"))?;
        Ok(lookup(&document, &segments).cloned())
    }

    fn populate(&self, relation: &str) -> DomainResult<()> {
        let related = self
            .relations
            .get(relation)
            .ok_or_else(|| DomainError::preload(relation, "unknown relation"))?;
        let segments =
            split_path(relation).map_err(|e| DomainError::preload(relation, e.to_string()))?;
        let mut document = self
            .document
            .write()
            .map_err(|_| DomainError::preload(relation, "record lock poisoned"))?;
        assign(&mut document, &segments, related.clone())
            .map_err(|reason| DomainError::preload(relation, reason))
    }
}

#[async_trait]
impl RecordAccessor for JsonRecord {
    async fn get(&self, path: &str) -> DomainResult<Option<Value>> {
        let value = self.read_path(path)?;
        trace!(path, found = value.is_some(), "json record lookup");
        Ok(value)
    }

    async fn preload(&self, relations: &[String]) -> DomainResult<()> {
        for relation in relations {
            debug!("preload: populating {}", relation);
            self.populate(relation)?;
        }
        Ok(())
    }
}

fn split_path(path: &str) -> DomainResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DomainError::accessor(path, "empty path segment"));
    }
    Ok(segments)
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn lookup<'v>(document: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(document, |current, segment| step(current, segment))
}

/// Replace the value at `segments`; every parent must already exist.
fn assign(document: &mut Value, segments: &[&str], value: Value) -> Result<(), String> {
    let Some((last, parents)) = segments.split_last() else {
        return Err("empty relation path".to_string());
    };
    let mut current = document;
    for segment in parents {
        current = match current {
            Value::Object(map) => map.get_mut(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| format!("parent segment '{segment}' does not exist"))?;
    }
    match current {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| format!("index '{last}' is out of bounds"))?;
            *slot = value;
            Ok(())
        }
        _ => Err(format!("cannot populate '{last}' inside a scalar value")),
    }
}
