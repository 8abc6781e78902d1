//! Data-defined schemas.
//!
//! A [`SchemaDefinition`] is the serializable form of a schema as authored in
//! JSON or TOML. Getters and predicates cannot be expressed as data, so the
//! definition refers to them by name and [`SchemaDefinition::resolve`] looks the
//! names up in a [`Capabilities`] registry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::schema::{
    child_location, Condition, ConditionSet, FieldNode, Getter, GroupNode, Inclusion, Predicate,
    Schema, SchemaNode, Unit, ValueMap, ValueSource,
};

/// Registry of named getters and predicates available to data-defined schemas.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    getters: HashMap<String, Getter>,
    predicates: HashMap<String, Predicate>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a getter under its own name.
    pub fn register_getter(&mut self, getter: Getter) -> &mut Self {
        self.getters.insert(getter.name().to_string(), getter);
        self
    }

    /// Register a predicate under its own name.
    pub fn register_predicate(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates
            .insert(predicate.name().to_string(), predicate);
        self
    }

    pub fn getter(&self, name: &str) -> Option<&Getter> {
        self.getters.get(name)
    }

    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }
}

/// One relation name or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Populate {
    One(String),
    Many(Vec<String>),
}

impl Populate {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Populate::One(relation) => vec![relation],
            Populate::Many(relations) => relations,
        }
    }
}

/// Right-hand side of an authored condition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDefinition {
    Predicate {
        #[serde(rename = "$predicate")]
        predicate: String,
    },
    Literal(Value),
}

/// Authored unit: a suffix or a `[singular, plural]` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitDefinition {
    Suffix(String),
    Forms(Vec<String>),
}

/// Authored node. Whether it is a group or a field is decided by its keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeDefinition {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<NodeDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<NodeDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, alias = "getter", skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
    #[serde(default)]
    pub keep_empty: bool,
    #[serde(default, alias = "if", skip_serializing_if = "Option::is_none")]
    pub include_if: Option<BTreeMap<String, RuleDefinition>>,
    #[serde(default, alias = "unless", skip_serializing_if = "Option::is_none")]
    pub include_unless: Option<BTreeMap<String, RuleDefinition>>,
    #[serde(default, alias = "map", skip_serializing_if = "Option::is_none")]
    pub value_map: Option<ValueMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitDefinition>,
}

/// Authored schema root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub populate: Option<Populate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<NodeDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<NodeDefinition>>,
}

impl SchemaDefinition {
    pub fn from_json(content: &str) -> DomainResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| DomainError::schema("<document>", format!("invalid JSON schema: {e}")))
    }

    pub fn from_toml(content: &str) -> DomainResult<Self> {
        toml::from_str(content)
            .map_err(|e| DomainError::schema("<document>", format!("invalid TOML schema: {e}")))
    }

    /// Turn the definition into a validated [`Schema`], binding capability names.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(self, capabilities: &Capabilities) -> DomainResult<Schema> {
        let children = match (self.groups, self.fields) {
            (Some(_), Some(_)) => {
                return Err(DomainError::schema(
                    "<root>",
                    "declares both 'groups' and 'fields'",
                ))
            }
            (Some(children), None) | (None, Some(children)) => children,
            (None, None) => Vec::new(),
        };
        let nodes = children
            .into_iter()
            .map(|node| node.resolve("", capabilities))
            .collect::<DomainResult<Vec<_>>>()?;
        let populate = self.populate.map(Populate::into_vec).unwrap_or_default();
        debug!(
            "resolved schema: {} top-level nodes, {} relations",
            nodes.len(),
            populate.len()
        );
        Schema::from_parts(populate, nodes)
    }
}

impl NodeDefinition {
    fn resolve(self, parent: &str, capabilities: &Capabilities) -> DomainResult<SchemaNode> {
        let location = child_location(parent, &self.label);
        let has_source = self.path.is_some() || self.get.is_some();
        let inclusion = Inclusion {
            include_if: resolve_conditions(self.include_if, &location, capabilities)?,
            include_unless: resolve_conditions(self.include_unless, &location, capabilities)?,
        };

        let children = match (self.groups, self.fields) {
            (Some(_), Some(_)) => {
                return Err(DomainError::schema(
                    location,
                    "declares both 'groups' and 'fields'",
                ))
            }
            (Some(children), None) | (None, Some(children)) => Some(children),
            (None, None) => None,
        };

        if let Some(children) = children {
            if has_source {
                return Err(DomainError::schema(
                    location,
                    "declares child nodes and a value source",
                ));
            }
            if self.value_map.is_some() || self.unit.is_some() {
                return Err(DomainError::schema(
                    location,
                    "groups cannot declare 'valueMap' or 'unit'",
                ));
            }
            let children = children
                .into_iter()
                .map(|child| child.resolve(&location, capabilities))
                .collect::<DomainResult<Vec<_>>>()?;
            return Ok(SchemaNode::Group(GroupNode {
                label: self.label,
                children,
                keep_empty: self.keep_empty,
                inclusion,
            }));
        }

        let source = match (self.path, self.get) {
            (Some(_), Some(_)) => {
                return Err(DomainError::schema(
                    location,
                    "declares both 'path' and 'get'",
                ))
            }
            (Some(path), None) => ValueSource::Path(path),
            (None, Some(name)) => match capabilities.getter(&name) {
                Some(getter) => ValueSource::Getter(getter.clone()),
                None => {
                    return Err(DomainError::schema(
                        location,
                        format!("getter '{name}' is not a registered capability"),
                    ))
                }
            },
            (None, None) => {
                return Err(DomainError::schema(
                    location,
                    "field has neither 'path' nor 'get'",
                ))
            }
        };

        let unit = self
            .unit
            .map(|unit| resolve_unit(unit, &location))
            .transpose()?;

        Ok(SchemaNode::Field(FieldNode {
            label: self.label,
            source,
            keep_empty: self.keep_empty,
            inclusion,
            value_map: self.value_map,
            unit,
        }))
    }
}

fn resolve_unit(unit: UnitDefinition, location: &str) -> DomainResult<Unit> {
    match unit {
        UnitDefinition::Suffix(suffix) => Ok(Unit::Suffix(suffix)),
        UnitDefinition::Forms(forms) => match <[String; 2]>::try_from(forms) {
            Ok([singular, plural]) => Ok(Unit::Forms { singular, plural }),
            Err(forms) => Err(DomainError::schema(
                location,
                format!(
                    "unit list needs exactly [singular, plural], got {} entries",
                    forms.len()
                ),
            )),
        },
    }
}

fn resolve_conditions(
    rules: Option<BTreeMap<String, RuleDefinition>>,
    location: &str,
    capabilities: &Capabilities,
) -> DomainResult<Option<ConditionSet>> {
    let Some(rules) = rules else {
        return Ok(None);
    };
    let mut set = ConditionSet::new();
    for (key, rule) in rules {
        let condition = match rule {
            RuleDefinition::Literal(literal) => Condition::Equals(literal),
            RuleDefinition::Predicate { predicate } => match capabilities.predicate(&predicate) {
                Some(found) => Condition::Predicate(found.clone()),
                None => {
                    return Err(DomainError::schema(
                        location,
                        format!(
                            "condition '{key}' refers to '{predicate}', which is not a registered predicate"
                        ),
                    ))
                }
            },
        };
        set.push(key, condition);
    }
    Ok(Some(set))
}
