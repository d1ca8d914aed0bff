//! Shared AST helpers for tree traversal and literal extraction

use tree_sitter::Node;

/// Get text content of a node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based line number of a node's start
pub fn line_number(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Visit all nodes in a tree with a visitor function (iterative to avoid
/// stack overflow on deeply nested sources)
pub fn visit_all<'tree, F>(node: &Node<'tree>, mut visitor: F)
where
    F: FnMut(&Node<'tree>),
{
    let mut cursor = node.walk();
    let mut did_visit_children = false;

    loop {
        if !did_visit_children {
            visitor(&cursor.node());

            if cursor.goto_first_child() {
                continue;
            }
        }

        if cursor.goto_next_sibling() {
            did_visit_children = false;
            continue;
        }

        if !cursor.goto_parent() {
            break;
        }
        did_visit_children = true;
    }
}

/// Extract the value of a string literal node, `None` for any other kind
///
/// Handles both quote styles and unescapes the common escape sequences.
/// Template strings are not literals for our purposes (they may contain
/// substitutions), so they resolve to `None`.
pub fn string_literal_value(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_fragment" => value.push_str(node_text(&child, source)),
            "escape_sequence" => {
                let raw = node_text(&child, source);
                value.push_str(&unescape(raw));
            }
            _ => {}
        }
    }
    Some(value)
}

fn unescape(raw: &str) -> String {
    match raw {
        "\\n" => "\n".to_string(),
        "\\t" => "\t".to_string(),
        "\\r" => "\r".to_string(),
        "\\'" => "'".to_string(),
        "\\\"" => "\"".to_string(),
        "\\\\" => "\\".to_string(),
        other => other.trim_start_matches('\\').to_string(),
    }
}

/// The key name of an object-literal `pair` node, for identifier and
/// string-literal keys (`{ event: ... }` and `{ 'event': ... }`)
pub fn pair_key_name(pair: &Node, source: &str) -> Option<String> {
    let key = pair.child_by_field_name("key")?;
    match key.kind() {
        "property_identifier" => Some(node_text(&key, source).to_string()),
        "string" => string_literal_value(&key, source),
        _ => None,
    }
}

/// Find the value of a named key inside an object literal node
pub fn object_property_value<'tree>(
    object: &Node<'tree>,
    key: &str,
    source: &str,
) -> Option<Node<'tree>> {
    if object.kind() != "object" {
        return None;
    }
    let mut cursor = object.walk();
    for child in object.named_children(&mut cursor) {
        if child.kind() == "pair" && pair_key_name(&child, source).as_deref() == Some(key) {
            return child.child_by_field_name("value");
        }
    }
    None
}

/// Unwrap the `Object.freeze({...})` idiom, returning the inner object
/// literal; a plain object literal passes through unchanged.
///
/// The wrapper call carries no semantic meaning beyond producing the wrapped
/// literal, so resolution treats both spellings identically.
pub fn unwrap_frozen_object<'tree>(node: &Node<'tree>, source: &str) -> Option<Node<'tree>> {
    if node.kind() == "object" {
        return Some(*node);
    }

    if node.kind() != "call_expression" {
        return None;
    }
    let callee = node.child_by_field_name("function")?;
    if callee.kind() != "member_expression" {
        return None;
    }
    let object = callee.child_by_field_name("object")?;
    let property = callee.child_by_field_name("property")?;
    if object.kind() != "identifier"
        || node_text(&object, source) != "Object"
        || node_text(&property, source) != "freeze"
    {
        return None;
    }

    let arguments = node.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments.named_children(&mut cursor).next()?;
    if first.kind() == "object" {
        Some(first)
    } else {
        None
    }
}
