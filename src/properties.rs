//! Property extraction from object-literal arguments
//!
//! Produces the property shapes recorded on detected events: literal values
//! get a concrete type, nested object literals keep their nested shape,
//! arrays record an element type when all elements agree, and anything
//! non-literal (identifiers, call results, spreads) is typed `any`.

use tree_sitter::Node;

use crate::ast::{node_text, pair_key_name};
use crate::schema::{EventProperty, PropertyMap};

/// Extract the property map from an object-literal node.
///
/// Non-object nodes yield an empty map; the caller decides whether a
/// missing properties argument is acceptable (it usually is).
pub fn extract_properties(object: &Node, source: &str) -> PropertyMap {
    let mut properties = PropertyMap::new();
    if object.kind() != "object" {
        return properties;
    }

    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        match entry.kind() {
            "pair" => {
                let Some(key) = pair_key_name(&entry, source) else {
                    continue;
                };
                let Some(value) = entry.child_by_field_name("value") else {
                    continue;
                };
                // duplicate keys within one literal: the later one wins,
                // as it does at runtime
                properties.insert_replace(&key, property_for_value(&value, source));
            }
            // `{ blah }` — value is a variable, type unknowable statically
            "shorthand_property_identifier" => {
                properties.insert_replace(node_text(&entry, source), EventProperty::of_type("any"));
            }
            // spreads and inline methods carry no analyzable property shape
            _ => {}
        }
    }

    properties
}

/// Build the property shape for a single value expression
pub fn property_for_value(value: &Node, source: &str) -> EventProperty {
    match value.kind() {
        "object" => EventProperty {
            prop_type: Some("object".to_string()),
            properties: Some(extract_properties(value, source)),
            ..EventProperty::default()
        },
        "array" => EventProperty {
            prop_type: Some("array".to_string()),
            items: Some(Box::new(EventProperty::of_type(array_item_type(value)))),
            ..EventProperty::default()
        },
        other => EventProperty::of_type(scalar_type(other)),
    }
}

/// Infer the type name for a value expression without nesting
pub fn infer_value_type(value: &Node) -> &'static str {
    match value.kind() {
        "object" => "object",
        "array" => "array",
        other => scalar_type(other),
    }
}

fn scalar_type(kind: &str) -> &'static str {
    match kind {
        "string" => "string",
        "number" => "number",
        "true" | "false" => "boolean",
        _ => "any",
    }
}

/// Common element type of an array literal, `any` when elements disagree
/// or the array is empty
fn array_item_type(array: &Node) -> &'static str {
    let mut cursor = array.walk();
    let mut item_type: Option<&'static str> = None;

    for element in array.named_children(&mut cursor) {
        let t = infer_value_type(&element);
        match item_type {
            None => item_type = Some(t),
            Some(seen) if seen == t => {}
            Some(_) => return "any",
        }
    }

    item_type.unwrap_or("any")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::visit_all;
    use crate::lang::Lang;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&Lang::JavaScript.tree_sitter_language())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn extract(source: &str) -> PropertyMap {
        let tree = parse(source);
        let root = tree.root_node();
        let mut object = None;
        visit_all(&root, |n| {
            if object.is_none() && n.kind() == "object" {
                object = Some(*n);
            }
        });
        extract_properties(&object.unwrap(), source)
    }

    #[test]
    fn test_scalar_types() {
        let props = extract("x({ name: 'a', total: 42, active: true });");
        assert_eq!(props.get("name").unwrap().prop_type.as_deref(), Some("string"));
        assert_eq!(props.get("total").unwrap().prop_type.as_deref(), Some("number"));
        assert_eq!(
            props.get("active").unwrap().prop_type.as_deref(),
            Some("boolean")
        );
    }

    #[test]
    fn test_non_literal_values_are_any() {
        let props = extract("x({ total: computeTotal(), id: orderId });");
        assert_eq!(props.get("total").unwrap().prop_type.as_deref(), Some("any"));
        assert_eq!(props.get("id").unwrap().prop_type.as_deref(), Some("any"));
    }

    #[test]
    fn test_shorthand_property_is_any() {
        let props = extract("x({ blah });");
        assert_eq!(props.get("blah").unwrap().prop_type.as_deref(), Some("any"));
    }

    #[test]
    fn test_nested_object() {
        let props = extract("x({ address: { city: 'SF', state: 'CA' } });");
        let address = props.get("address").unwrap();
        assert_eq!(address.prop_type.as_deref(), Some("object"));
        let nested = address.properties.as_ref().unwrap();
        assert_eq!(nested.get("city").unwrap().prop_type.as_deref(), Some("string"));
        assert_eq!(nested.get("state").unwrap().prop_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_array_of_strings() {
        let props = extract("x({ list: ['a', 'b', 'c'] });");
        let list = props.get("list").unwrap();
        assert_eq!(list.prop_type.as_deref(), Some("array"));
        assert_eq!(
            list.items.as_ref().unwrap().prop_type.as_deref(),
            Some("string")
        );
    }

    #[test]
    fn test_array_of_objects() {
        let props = extract("x({ products: [{ id: '1' }, { id: '2' }] });");
        let products = props.get("products").unwrap();
        assert_eq!(products.prop_type.as_deref(), Some("array"));
        assert_eq!(
            products.items.as_ref().unwrap().prop_type.as_deref(),
            Some("object")
        );
    }

    #[test]
    fn test_mixed_array_is_any() {
        let props = extract("x({ mixed: ['a', 1] });");
        assert_eq!(
            props.get("mixed").unwrap().items.as_ref().unwrap().prop_type.as_deref(),
            Some("any")
        );
    }

    #[test]
    fn test_empty_array_is_any() {
        let props = extract("x({ empty: [] });");
        assert_eq!(
            props.get("empty").unwrap().items.as_ref().unwrap().prop_type.as_deref(),
            Some("any")
        );
    }

    #[test]
    fn test_property_order_follows_source() {
        let props = extract("x({ zeta: 1, alpha: 2 });");
        let keys: Vec<_> = props.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_string_keys() {
        let props = extract("x({ 'formId': 'contactForm' });");
        assert_eq!(
            props.get("formId").unwrap().prop_type.as_deref(),
            Some("string")
        );
    }
}
