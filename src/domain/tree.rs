/*
Text rendering of schemas and output trees via termtree.

Both trees are recursive enums, so the conversion is a plain recursive map
from node to `Tree<String>` with the children as leaves.
 */
use serde_json::Value;
use termtree::Tree;

use crate::domain::output::OutputNode;
use crate::domain::schema::{Condition, Inclusion, Schema, SchemaNode, Unit, ValueSource};
use crate::domain::value;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for SchemaNode {
    fn to_tree_string(&self) -> Tree<String> {
        match self {
            SchemaNode::Group(group) => {
                let mut root = format!("{} [group]", group.label);
                decorate(&mut root, group.keep_empty, &group.inclusion);
                let leaves: Vec<_> = group.children.iter().map(|c| c.to_tree_string()).collect();
                Tree::new(root).with_leaves(leaves)
            }
            SchemaNode::Field(field) => {
                let source = match &field.source {
                    ValueSource::Path(path) => path.clone(),
                    ValueSource::Getter(getter) => format!("get:{}", getter.name()),
                };
                let mut root = format!("{} <- {}", field.label, source);
                if let Some(map) = &field.value_map {
                    root.push_str(&format!(" map({})", map.len()));
                }
                match &field.unit {
                    Some(Unit::Suffix(suffix)) => root.push_str(&format!(" unit({suffix:?})")),
                    Some(Unit::Forms { singular, plural }) => {
                        root.push_str(&format!(" unit({singular:?}/{plural:?})"))
                    }
                    None => {}
                }
                decorate(&mut root, field.keep_empty, &field.inclusion);
                Tree::new(root)
            }
        }
    }
}

impl TreeNodeConvert for OutputNode {
    fn to_tree_string(&self) -> Tree<String> {
        match self {
            OutputNode::Group { label, data } => {
                let leaves: Vec<_> = data.iter().map(|c| c.to_tree_string()).collect();
                Tree::new(label.clone()).with_leaves(leaves)
            }
            OutputNode::Field { label, display, .. } => {
                Tree::new(format!("{}: {}", label, display_text(display.as_ref())))
            }
        }
    }
}

/// Render a whole schema under a root labelled with its name.
pub fn schema_tree(name: &str, schema: &Schema) -> Tree<String> {
    let mut root = name.to_string();
    if !schema.populate().is_empty() {
        root.push_str(&format!(" (populate: {})", schema.populate().join(", ")));
    }
    let leaves: Vec<_> = schema.children().iter().map(|c| c.to_tree_string()).collect();
    Tree::new(root).with_leaves(leaves)
}

/// Render extraction output under a root labelled with the schema name.
pub fn output_tree(name: &str, nodes: &[OutputNode]) -> Tree<String> {
    let leaves: Vec<_> = nodes.iter().map(|n| n.to_tree_string()).collect();
    Tree::new(name.to_string()).with_leaves(leaves)
}

fn display_text(display: Option<&Value>) -> String {
    match display {
        Some(Value::String(s)) => s.clone(),
        Some(other) if !value::is_primitive(Some(other)) => other.to_string(),
        other => value::to_text(other),
    }
}

fn decorate(root: &mut String, keep_empty: bool, inclusion: &Inclusion) {
    if keep_empty {
        root.push_str(" keep-empty");
    }
    if let Some(set) = &inclusion.include_if {
        root.push_str(&format!(" if({})", describe(set.iter())));
    }
    if let Some(set) = &inclusion.include_unless {
        root.push_str(&format!(" unless({})", describe(set.iter())));
    }
}

fn describe<'a>(entries: impl Iterator<Item = (&'a str, &'a Condition)>) -> String {
    entries
        .map(|(key, condition)| match condition {
            Condition::Equals(literal) => format!("{key}={literal}"),
            Condition::Predicate(predicate) => format!("{key}:{}", predicate.name()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{ConditionSet, FieldNode, GroupNode};
    use serde_json::json;

    #[test]
    fn given_schema_when_rendering_then_lists_groups_and_fields() {
        let schema = Schema::builder()
            .populate("owner")
            .group(
                GroupNode::new("Basics")
                    .field(FieldNode::path("Name", "name"))
                    .field(FieldNode::path("Age", "age").unit(Unit::forms(" year", " years")))
                    .include_if(ConditionSet::new().equals("active", json!(true))),
            )
            .build()
            .unwrap();

        let rendered = schema_tree("person", &schema).to_string();

        assert!(rendered.starts_with("person (populate: owner)"));
        assert!(rendered.contains("Basics [group] if(active=true)"));
        assert!(rendered.contains("Name <- name"));
        assert!(rendered.contains("Age <- age unit(\" year\"/\" years\")"));
    }

    #[test]
    fn given_output_when_rendering_then_shows_display_values() {
        let nodes = vec![OutputNode::Group {
            label: "Basics".into(),
            data: vec![OutputNode::Field {
                label: "Age".into(),
                value: Some(json!(1)),
                display: Some(json!("1 year")),
                path: Some("age".into()),
            }],
        }];

        let rendered = output_tree("person", &nodes).to_string();

        assert!(rendered.contains("Basics"));
        assert!(rendered.contains("Age: 1 year"));
    }
}
