//! Output tree produced by the extractor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the pruned, formatted output tree.
///
/// Serializes as `{"type": "group", ...}` or `{"type": "field", ...}`. Absent
/// raw values, displays and paths are omitted rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputNode {
    Group {
        label: String,
        data: Vec<OutputNode>,
    },
    Field {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

impl OutputNode {
    pub fn label(&self) -> &str {
        match self {
            OutputNode::Group { label, .. } | OutputNode::Field { label, .. } => label,
        }
    }

    /// Children of a group; empty for fields.
    pub fn data(&self) -> &[OutputNode] {
        match self {
            OutputNode::Group { data, .. } => data,
            OutputNode::Field { .. } => &[],
        }
    }

    /// Display value of a field.
    pub fn display(&self) -> Option<&Value> {
        match self {
            OutputNode::Field { display, .. } => display.as_ref(),
            OutputNode::Group { .. } => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, OutputNode::Group { .. })
    }
}
