//! Schema model: a tree of groups and fields.
//!
//! Nodes are plain data plus capabilities (getters and predicates). A `Schema`
//! is only obtainable through [`SchemaBuilder::build`] or a resolved
//! definition, both of which validate the shape of every node.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future::{self, BoxFuture, FutureExt};
use regex::Regex;
use serde_json::Value;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::RecordAccessor;
use crate::domain::value;

type GetterFn =
    dyn for<'r> Fn(&'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<Option<Value>>>
        + Send
        + Sync;

type PredicateFn =
    dyn for<'r> Fn(&'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<bool>> + Send + Sync;

/// Named function producing a field value from a record.
#[derive(Clone)]
pub struct Getter {
    name: String,
    func: Arc<GetterFn>,
}

impl Getter {
    /// Wrap a suspending getter.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'r> Fn(&'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<Option<Value>>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap a getter that answers immediately without suspending.
    pub fn immediate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&dyn RecordAccessor) -> DomainResult<Option<Value>> + Send + Sync + 'static,
    {
        Self::new(name, move |record| future::ready(func(record)).boxed())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call<'r>(&self, record: &'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<Option<Value>>> {
        (self.func)(record)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Getter").field(&self.name).finish()
    }
}

/// Named boolean test over a record.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Wrap a suspending predicate.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'r> Fn(&'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<bool>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap a predicate that answers immediately without suspending.
    pub fn immediate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&dyn RecordAccessor) -> DomainResult<bool> + Send + Sync + 'static,
    {
        Self::new(name, move |record| future::ready(func(record)).boxed())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call<'r>(&self, record: &'r dyn RecordAccessor) -> BoxFuture<'r, DomainResult<bool>> {
        (self.func)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

/// Right-hand side of a condition entry.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Compared against the record value at the entry key with loose equality.
    Equals(Value),
    /// Invoked with the whole record; the entry key is only descriptive.
    Predicate(Predicate),
}

/// AND-combined condition entries, in authored order.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    entries: Vec<(String, Condition)>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal comparison against the value at `path`.
    pub fn equals(mut self, path: impl Into<String>, literal: impl Into<Value>) -> Self {
        self.entries
            .push((path.into(), Condition::Equals(literal.into())));
        self
    }

    /// Add a predicate entry.
    pub fn predicate(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        self.entries.push((key.into(), Condition::Predicate(predicate)));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, condition: Condition) {
        self.entries.push((key.into(), condition));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inclusion rules attached to a group or field.
#[derive(Debug, Clone, Default)]
pub struct Inclusion {
    pub include_if: Option<ConditionSet>,
    pub include_unless: Option<ConditionSet>,
}

impl Inclusion {
    /// True when neither condition set is declared.
    pub fn is_unconditional(&self) -> bool {
        self.include_if.is_none() && self.include_unless.is_none()
    }
}

/// Suffix appended to a field's display value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Suffix(String),
    Forms { singular: String, plural: String },
}

impl Unit {
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    pub fn forms(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self::Forms {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Suffix for a raw value; only the number 1 takes the singular form.
    pub fn for_value(&self, raw: Option<&Value>) -> &str {
        match self {
            Unit::Suffix(suffix) => suffix,
            Unit::Forms { singular, .. } if value::is_one(raw) => singular,
            Unit::Forms { plural, .. } => plural,
        }
    }
}

/// Display overrides keyed by the text form of the raw value.
pub type ValueMap = BTreeMap<String, Value>;

/// Where a field's raw value comes from.
#[derive(Debug, Clone)]
pub enum ValueSource {
    Path(String),
    Getter(Getter),
}

/// Leaf node extracting and formatting one value.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub label: String,
    pub source: ValueSource,
    pub keep_empty: bool,
    pub inclusion: Inclusion,
    pub value_map: Option<ValueMap>,
    pub unit: Option<Unit>,
}

impl FieldNode {
    fn with_source(label: impl Into<String>, source: ValueSource) -> Self {
        Self {
            label: label.into(),
            source,
            keep_empty: false,
            inclusion: Inclusion::default(),
            value_map: None,
            unit: None,
        }
    }

    /// Field reading a dotted record path.
    pub fn path(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_source(label, ValueSource::Path(path.into()))
    }

    /// Field computed by a getter.
    pub fn getter(label: impl Into<String>, getter: Getter) -> Self {
        Self::with_source(label, ValueSource::Getter(getter))
    }

    pub fn keep_empty(mut self) -> Self {
        self.keep_empty = true;
        self
    }

    pub fn include_if(mut self, conditions: ConditionSet) -> Self {
        self.inclusion.include_if = Some(conditions);
        self
    }

    pub fn include_unless(mut self, conditions: ConditionSet) -> Self {
        self.inclusion.include_unless = Some(conditions);
        self
    }

    /// Add one display override for the raw value whose text form is `key`.
    pub fn map_value(mut self, key: impl Into<String>, display: impl Into<Value>) -> Self {
        self.value_map
            .get_or_insert_with(ValueMap::new)
            .insert(key.into(), display.into());
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Source path, if the value is read from a path.
    pub fn source_path(&self) -> Option<&str> {
        match &self.source {
            ValueSource::Path(path) => Some(path),
            ValueSource::Getter(_) => None,
        }
    }
}

/// Labelled node aggregating child nodes.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub label: String,
    pub children: Vec<SchemaNode>,
    pub keep_empty: bool,
    pub inclusion: Inclusion,
}

impl GroupNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            keep_empty: false,
            inclusion: Inclusion::default(),
        }
    }

    pub fn field(mut self, field: FieldNode) -> Self {
        self.children.push(SchemaNode::Field(field));
        self
    }

    pub fn group(mut self, group: GroupNode) -> Self {
        self.children.push(SchemaNode::Group(group));
        self
    }

    pub fn child(mut self, node: impl Into<SchemaNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn keep_empty(mut self) -> Self {
        self.keep_empty = true;
        self
    }

    pub fn include_if(mut self, conditions: ConditionSet) -> Self {
        self.inclusion.include_if = Some(conditions);
        self
    }

    pub fn include_unless(mut self, conditions: ConditionSet) -> Self {
        self.inclusion.include_unless = Some(conditions);
        self
    }
}

/// A schema node is either a group or a field, never both.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Group(GroupNode),
    Field(FieldNode),
}

impl SchemaNode {
    pub fn label(&self) -> &str {
        match self {
            SchemaNode::Group(group) => &group.label,
            SchemaNode::Field(field) => &field.label,
        }
    }

    pub fn inclusion(&self) -> &Inclusion {
        match self {
            SchemaNode::Group(group) => &group.inclusion,
            SchemaNode::Field(field) => &field.inclusion,
        }
    }

    /// Check the shape of this node and its descendants.
    pub fn validate(&self, location: &str) -> DomainResult<()> {
        let location = child_location(location, self.label());
        validate_inclusion(self.inclusion(), &location)?;
        match self {
            SchemaNode::Group(group) => {
                for child in &group.children {
                    child.validate(&location)?;
                }
            }
            SchemaNode::Field(field) => {
                if let ValueSource::Path(path) = &field.source {
                    validate_path(path, &location)?;
                }
            }
        }
        Ok(())
    }
}

impl From<GroupNode> for SchemaNode {
    fn from(group: GroupNode) -> Self {
        SchemaNode::Group(group)
    }
}

impl From<FieldNode> for SchemaNode {
    fn from(field: FieldNode) -> Self {
        SchemaNode::Field(field)
    }
}

/// Resolved, validated schema root.
#[derive(Debug, Clone)]
pub struct Schema {
    populate: Vec<String>,
    children: Vec<SchemaNode>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build a schema from already-constructed parts, validating every node.
    #[instrument(level = "debug", skip(children))]
    pub fn from_parts(populate: Vec<String>, children: Vec<SchemaNode>) -> DomainResult<Self> {
        for relation in &populate {
            validate_path(relation, "populate")?;
        }
        for child in &children {
            child.validate("")?;
        }
        Ok(Self { populate, children })
    }

    /// Relations to preload before extraction.
    pub fn populate(&self) -> &[String] {
        &self.populate
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }
}

/// Code-side construction of a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    populate: Vec<String>,
    children: Vec<SchemaNode>,
}

impl SchemaBuilder {
    pub fn populate(mut self, relation: impl Into<String>) -> Self {
        self.populate.push(relation.into());
        self
    }

    pub fn group(mut self, group: GroupNode) -> Self {
        self.children.push(SchemaNode::Group(group));
        self
    }

    pub fn field(mut self, field: FieldNode) -> Self {
        self.children.push(SchemaNode::Field(field));
        self
    }

    pub fn build(self) -> DomainResult<Schema> {
        Schema::from_parts(self.populate, self.children)
    }
}

pub(crate) fn child_location(parent: &str, label: &str) -> String {
    let label = if label.is_empty() { "<unlabelled>" } else { label };
    if parent.is_empty() {
        label.to_string()
    } else {
        format!("{parent} > {label}")
    }
}

fn path_regex() -> &'static Regex {
    static PATH: OnceLock<Regex> = OnceLock::new();
    PATH.get_or_init(|| Regex::new(r"^[^.\s]+(\.[^.\s]+)*$").unwrap())
}

/// Dotted path made of non-empty segments without whitespace.
pub fn is_valid_path(path: &str) -> bool {
    path_regex().is_match(path)
}

fn validate_path(path: &str, location: &str) -> DomainResult<()> {
    if is_valid_path(path) {
        Ok(())
    } else {
        Err(DomainError::schema(location, format!("invalid path '{path}'")))
    }
}

fn validate_inclusion(inclusion: &Inclusion, location: &str) -> DomainResult<()> {
    let sets = [&inclusion.include_if, &inclusion.include_unless];
    for set in sets.into_iter().flatten() {
        for (key, condition) in set.iter() {
            match condition {
                Condition::Equals(_) => validate_path(key, location)?,
                Condition::Predicate(_) if key.is_empty() => {
                    return Err(DomainError::schema(location, "empty predicate key"));
                }
                Condition::Predicate(_) => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_unit_forms_when_selecting_suffix_then_only_one_is_singular() {
        let unit = Unit::forms("item", "items");
        assert_eq!(unit.for_value(Some(&json!(1))), "item");
        assert_eq!(unit.for_value(Some(&json!(2))), "items");
        assert_eq!(unit.for_value(Some(&json!(0))), "items");
        assert_eq!(unit.for_value(Some(&json!(-1))), "items");
        assert_eq!(unit.for_value(Some(&json!("1"))), "items");
        assert_eq!(unit.for_value(None), "items");
    }

    #[test]
    fn given_paths_when_validating_then_rejects_empty_segments() {
        assert!(is_valid_path("name"));
        assert!(is_valid_path("owner.address.city"));
        assert!(is_valid_path("items.0.title"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("owner..city"));
        assert!(!is_valid_path(".name"));
        assert!(!is_valid_path("name."));
        assert!(!is_valid_path("first name"));
    }

    #[test]
    fn given_field_with_invalid_path_when_building_then_reports_location() {
        let result = Schema::builder()
            .group(GroupNode::new("Basics").field(FieldNode::path("Name", "a..b")))
            .build();

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Basics > Name"), "got: {err}");
        assert!(err.contains("a..b"), "got: {err}");
    }

    #[test]
    fn given_condition_with_invalid_key_when_building_then_fails() {
        let result = Schema::builder()
            .field(
                FieldNode::path("Name", "name")
                    .include_if(ConditionSet::new().equals("", json!(1))),
            )
            .build();

        assert!(matches!(result, Err(DomainError::Schema { .. })));
    }

    #[test]
    fn given_invalid_populate_relation_when_building_then_fails() {
        let result = Schema::builder().populate("owner..id").build();
        assert!(matches!(result, Err(DomainError::Schema { .. })));
    }

    #[test]
    fn given_field_builders_when_chaining_then_sets_attributes() {
        let field = FieldNode::path("Status", "status")
            .keep_empty()
            .map_value("1", "Active")
            .map_value("0", "Inactive")
            .unit(Unit::suffix("!"));

        assert!(field.keep_empty);
        assert_eq!(field.source_path(), Some("status"));
        assert_eq!(field.value_map.as_ref().map(|m| m.len()), Some(2));
        assert_eq!(field.unit, Some(Unit::suffix("!")));
    }
}
