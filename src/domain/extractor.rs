//! Recursive schema walk producing the pruned output tree.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{debug, instrument};

use crate::domain::condition::ConditionEvaluator;
use crate::domain::error::DomainResult;
use crate::domain::format;
use crate::domain::output::OutputNode;
use crate::domain::record::RecordAccessor;
use crate::domain::schema::{FieldNode, GroupNode, Schema, SchemaNode, ValueSource};
use crate::domain::value;

/// Walks a schema against a record.
///
/// Stateless: every call is independent, so one extractor can serve any
/// number of concurrent extractions.
#[derive(Debug, Default, Clone)]
pub struct TreeExtractor {
    evaluator: ConditionEvaluator,
}

impl TreeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the surviving top-level nodes of a schema.
    ///
    /// Preloading `schema.populate()` is the caller's job and must happen first.
    #[instrument(level = "debug", skip_all)]
    pub async fn extract(
        &self,
        schema: &Schema,
        record: &dyn RecordAccessor,
    ) -> DomainResult<Vec<OutputNode>> {
        self.extract_children(schema.children(), record).await
    }

    /// Extract a single node; `None` when it is pruned.
    pub fn extract_node<'a>(
        &'a self,
        node: &'a SchemaNode,
        record: &'a dyn RecordAccessor,
    ) -> BoxFuture<'a, DomainResult<Option<OutputNode>>> {
        match node {
            SchemaNode::Group(group) => self.extract_group(group, record).boxed(),
            SchemaNode::Field(field) => self.extract_field(field, record).boxed(),
        }
    }

    /// Siblings run concurrently; output keeps declaration order.
    fn extract_children<'a>(
        &'a self,
        children: &'a [SchemaNode],
        record: &'a dyn RecordAccessor,
    ) -> BoxFuture<'a, DomainResult<Vec<OutputNode>>> {
        async move {
            let results =
                try_join_all(children.iter().map(|child| self.extract_node(child, record)))
                    .await?;
            Ok(results.into_iter().flatten().collect())
        }
        .boxed()
    }

    async fn extract_group(
        &self,
        group: &GroupNode,
        record: &dyn RecordAccessor,
    ) -> DomainResult<Option<OutputNode>> {
        debug!("Processing group {}", group.label);
        let data = self.extract_children(&group.children, record).await?;

        if data.is_empty() && !group.keep_empty {
            debug!("Dropping group {}: empty data and !keep_empty", group.label);
            return Ok(None);
        }
        if !self.evaluator.evaluate(&group.inclusion, record).await? {
            debug!("Not keeping group {}: condition failed", group.label);
            return Ok(None);
        }

        Ok(Some(OutputNode::Group {
            label: group.label.clone(),
            data,
        }))
    }

    async fn extract_field(
        &self,
        field: &FieldNode,
        record: &dyn RecordAccessor,
    ) -> DomainResult<Option<OutputNode>> {
        debug!("Processing field {}", field.label);
        let raw = match &field.source {
            ValueSource::Getter(getter) => {
                debug!("Using getter {} on field {}", getter.name(), field.label);
                getter.call(record).await?
            }
            ValueSource::Path(path) => record.get(path).await?,
        };

        if value::is_empty(raw.as_ref()) && !field.keep_empty {
            debug!("Not keeping field {}: empty value and !keep_empty", field.label);
            return Ok(None);
        }
        if !self.evaluator.evaluate(&field.inclusion, record).await? {
            debug!("Not keeping field {}: condition failed", field.label);
            return Ok(None);
        }

        let display = format::display_value(field, raw.as_ref());
        Ok(Some(OutputNode::Field {
            label: field.label.clone(),
            value: raw,
            display,
            path: field.source_path().map(str::to_string),
        }))
    }
}
