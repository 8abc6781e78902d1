//! Display formatting for field values: value map lookup, then unit suffix.

use serde_json::Value;

use crate::domain::schema::{FieldNode, Unit, ValueMap};
use crate::domain::value;

/// Compute the display value of a field from its raw value.
pub fn display_value(field: &FieldNode, raw: Option<&Value>) -> Option<Value> {
    let display = map_value(field.value_map.as_ref(), raw);
    match &field.unit {
        Some(unit) => append_unit(display, unit, raw),
        None => display,
    }
}

/// Replace the raw value with its value map entry, keyed by the raw text form.
fn map_value(value_map: Option<&ValueMap>, raw: Option<&Value>) -> Option<Value> {
    let mapped = value_map.and_then(|map| map.get(&value::to_text(raw)));
    mapped.or(raw).cloned()
}

/// Units only attach to primitive displays; the result is always text.
fn append_unit(display: Option<Value>, unit: &Unit, raw: Option<&Value>) -> Option<Value> {
    if !value::is_primitive(display.as_ref()) {
        return display;
    }
    let mut text = value::to_text(display.as_ref());
    text.push_str(unit.for_value(raw));
    Some(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_no_map_or_unit_when_formatting_then_display_is_raw() {
        let field = FieldNode::path("Age", "age");
        assert_eq!(display_value(&field, Some(&json!(7))), Some(json!(7)));
        assert_eq!(display_value(&field, None), None);
    }

    #[test]
    fn given_value_map_and_unit_when_formatting_then_maps_before_suffixing() {
        let field = FieldNode::path("Count", "count")
            .map_value("2", "Two")
            .unit(Unit::suffix("x"));
        assert_eq!(display_value(&field, Some(&json!(2))), Some(json!("Twox")));
    }

    #[test]
    fn given_value_map_miss_when_formatting_then_keeps_raw() {
        let field = FieldNode::path("Count", "count").map_value("2", "Two");
        assert_eq!(display_value(&field, Some(&json!(3))), Some(json!(3)));
    }

    #[test]
    fn given_non_string_raw_when_mapping_then_looks_up_text_form() {
        let field = FieldNode::path("Flag", "flag")
            .map_value("true", "Yes")
            .map_value("null", "Unknown");
        assert_eq!(display_value(&field, Some(&json!(true))), Some(json!("Yes")));
        assert_eq!(
            display_value(&field, Some(&Value::Null)),
            Some(json!("Unknown"))
        );
    }

    #[test]
    fn given_unit_forms_when_formatting_then_pluralises_on_raw_value() {
        let field = FieldNode::path("Items", "items").unit(Unit::forms("item", "items"));
        assert_eq!(display_value(&field, Some(&json!(1))), Some(json!("1item")));
        assert_eq!(display_value(&field, Some(&json!(2))), Some(json!("2items")));
        assert_eq!(display_value(&field, Some(&json!(0))), Some(json!("0items")));
    }

    #[test]
    fn given_mapped_display_when_pluralising_then_uses_raw_not_display() {
        let field = FieldNode::path("Items", "items")
            .map_value("1", "one")
            .unit(Unit::forms(" item", " items"));
        assert_eq!(
            display_value(&field, Some(&json!(1))),
            Some(json!("one item"))
        );
    }

    #[test]
    fn given_container_display_when_appending_unit_then_leaves_it_untouched() {
        let field = FieldNode::path("Tags", "tags").unit(Unit::suffix(" tags"));
        assert_eq!(
            display_value(&field, Some(&json!(["a", "b"]))),
            Some(json!(["a", "b"]))
        );
    }

    #[test]
    fn given_absent_raw_with_unit_when_formatting_then_renders_undefined_text() {
        let field = FieldNode::path("Weight", "weight").unit(Unit::suffix(" kg"));
        assert_eq!(display_value(&field, None), Some(json!("undefined kg")));
    }
}
