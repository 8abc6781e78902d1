//! Domain layer: schema model and the extraction engine
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).
//! Records are reached only through the [`RecordAccessor`] trait.

pub mod condition;
pub mod definition;
pub mod error;
pub mod extractor;
pub mod format;
pub mod output;
pub mod record;
pub mod schema;
pub mod tree;
pub mod value;

pub use condition::ConditionEvaluator;
pub use definition::{Capabilities, NodeDefinition, SchemaDefinition};
pub use error::{DomainError, DomainResult};
pub use extractor::TreeExtractor;
pub use output::OutputNode;
pub use record::RecordAccessor;
pub use schema::{
    Condition, ConditionSet, FieldNode, Getter, GroupNode, Inclusion, Predicate, Schema,
    SchemaBuilder, SchemaNode, Unit, ValueMap, ValueSource,
};
pub use tree::{output_tree, schema_tree, TreeNodeConvert};
