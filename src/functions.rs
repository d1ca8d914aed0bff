//! Enclosing-function lookup for call sites
//!
//! Walks a call site's ancestors to name the function it lives in. Call
//! sites inside React hook callbacks compose the component and hook names
//! (`PrePaymentDashboard.useEffect`) so the implementation location stays
//! meaningful in component code.

use tree_sitter::Node;

use crate::ast::node_text;

const REACT_HOOKS: &[&str] = &[
    "useEffect",
    "useLayoutEffect",
    "useInsertionEffect",
    "useCallback",
    "useMemo",
    "useReducer",
    "useState",
    "useImperativeHandle",
    "useDeferredValue",
    "useTransition",
];

/// Name of the function enclosing `node`, `None` at top level
pub fn enclosing_function_name(node: &Node, source: &str) -> Option<String> {
    let mut hook_name: Option<String> = None;
    let mut function_name: Option<String> = None;

    let mut current = node.parent();
    while let Some(ancestor) = current {
        // a React hook call between the call site and its component
        if hook_name.is_none() && ancestor.kind() == "call_expression" {
            if let Some(callee) = ancestor.child_by_field_name("function") {
                if callee.kind() == "identifier" {
                    let name = node_text(&callee, source);
                    if REACT_HOOKS.contains(&name) {
                        hook_name = Some(name.to_string());
                    }
                }
            }
        }

        if function_name.is_none() {
            function_name = name_of_function_node(&ancestor, source);
        }

        if function_name.is_some() && hook_name.is_some() {
            break;
        }

        current = ancestor.parent();
    }

    match (function_name, hook_name) {
        (Some(function), Some(hook)) => Some(format!("{}.{}", function, hook)),
        (Some(function), None) => Some(function),
        (None, Some(hook)) => Some(hook),
        (None, None) => None,
    }
}

/// Name of a function-like node, following assignments and object keys for
/// anonymous function forms
fn name_of_function_node(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let name = node.child_by_field_name("name")?;
            Some(node_text(&name, source).to_string())
        }
        "method_definition" => {
            let name = node.child_by_field_name("name")?;
            Some(node_text(&name, source).to_string())
        }
        "arrow_function" | "function_expression" => {
            let parent = node.parent()?;
            match parent.kind() {
                // const myFunc = () => {...}
                "variable_declarator" => {
                    let name = parent.child_by_field_name("name")?;
                    if name.kind() == "identifier" {
                        Some(node_text(&name, source).to_string())
                    } else {
                        None
                    }
                }
                // { handler: () => {...} }
                "pair" => crate::ast::pair_key_name(&parent, source),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::visit_all;
    use crate::lang::Lang;

    /// Enclosing function of the call to `target(...)` in `source`
    fn enclosing(source: &str, target: &str) -> Option<String> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&Lang::JavaScript.tree_sitter_language())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();

        let mut found = None;
        visit_all(&tree.root_node(), |n| {
            if n.kind() == "call_expression" {
                if let Some(callee) = n.child_by_field_name("function") {
                    if node_text(&callee, source) == target {
                        found = Some(*n);
                    }
                }
            }
        });
        enclosing_function_name(&found.unwrap(), source)
    }

    #[test]
    fn test_function_declaration() {
        let source = "function checkout() { track('a', {}); }";
        assert_eq!(enclosing(source, "track").as_deref(), Some("checkout"));
    }

    #[test]
    fn test_arrow_function_assignment() {
        let source = "const trackGA4 = () => { track('a', {}); };";
        assert_eq!(enclosing(source, "track").as_deref(), Some("trackGA4"));
    }

    #[test]
    fn test_class_method() {
        let source = "class C { trackSnowplow() { track('a', {}); } }";
        assert_eq!(enclosing(source, "track").as_deref(), Some("trackSnowplow"));
    }

    #[test]
    fn test_object_literal_method() {
        let source = "const api = { submit: () => { track('a', {}); } };";
        assert_eq!(enclosing(source, "track").as_deref(), Some("submit"));
    }

    #[test]
    fn test_top_level_is_none() {
        let source = "track('a', {});";
        assert_eq!(enclosing(source, "track"), None);
    }

    #[test]
    fn test_nested_functions_use_innermost() {
        let source = "function outer() { const inner = () => { track('a', {}); }; }";
        assert_eq!(enclosing(source, "track").as_deref(), Some("inner"));
    }

    #[test]
    fn test_react_hook_composes_component_name() {
        let source = r#"
const PrePaymentDashboard = () => {
  useEffect(() => {
    track('ViewedEligibilityResults');
  }, []);
  return null;
};
"#;
        assert_eq!(
            enclosing(source, "track").as_deref(),
            Some("PrePaymentDashboard.useEffect")
        );
    }

    #[test]
    fn test_bare_hook_without_component() {
        let source = "useEffect(() => { track('a'); }, []);";
        assert_eq!(enclosing(source, "track").as_deref(), Some("useEffect"));
    }
}
