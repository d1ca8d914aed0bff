//! Constant resolution for event-name expressions
//!
//! Event names are often referenced through local constants:
//!
//! ```text
//! const TRACKING_EVENTS = Object.freeze({
//!   PURCHASE: 'ecommerce_purchase',
//! });
//! mixpanel.track(TRACKING_EVENTS.PURCHASE, { ... });
//! ```
//!
//! The resolver follows an identifier or a non-computed member chain back
//! through the declaration of its root identifier and down nested
//! object-literal initializers to a string literal. Resolution is
//! all-or-nothing: if any segment bottoms out in anything other than nested
//! string-valued object-literal properties (a call result, a dynamic index,
//! an unknown identifier) the whole expression is unresolved.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::ast::{
    node_text, object_property_value, string_literal_value, unwrap_frozen_object, visit_all,
};

/// Declaration lookup capability, the seam between the resolver and the
/// host parser's scope analysis.
///
/// Implementations map a root identifier to the initializer expression of
/// its declaration.
pub trait DeclarationLookup<'tree> {
    fn resolve_declaration(&self, name: &str) -> Option<Node<'tree>>;
}

/// File-level index of `const` declarations.
///
/// Indexes every `const name = <initializer>` in the file in one traversal.
/// Later declarations of the same name shadow earlier ones, which matches
/// how the last-declared constant would win for call sites below it.
pub struct ScopeIndex<'tree> {
    declarations: HashMap<String, Node<'tree>>,
}

impl<'tree> ScopeIndex<'tree> {
    pub fn build(root: &Node<'tree>, source: &str) -> Self {
        let mut declarations = HashMap::new();

        visit_all(root, |node| {
            if node.kind() != "lexical_declaration" {
                return;
            }
            // only `const`; `let` bindings may be reassigned
            let is_const = node
                .child(0)
                .map(|c| c.kind() == "const")
                .unwrap_or(false);
            if !is_const {
                return;
            }

            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name) = declarator.child_by_field_name("name") else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                if let Some(value) = declarator.child_by_field_name("value") {
                    declarations.insert(node_text(&name, source).to_string(), value);
                }
            }
        });

        Self { declarations }
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl<'tree> DeclarationLookup<'tree> for ScopeIndex<'tree> {
    fn resolve_declaration(&self, name: &str) -> Option<Node<'tree>> {
        self.declarations.get(name).copied()
    }
}

/// Resolves expressions to compile-time-knowable string literals
pub struct ConstantResolver<'a, 'tree> {
    lookup: &'a dyn DeclarationLookup<'tree>,
    source: &'a str,
}

impl<'a, 'tree> ConstantResolver<'a, 'tree> {
    pub fn new(lookup: &'a dyn DeclarationLookup<'tree>, source: &'a str) -> Self {
        Self { lookup, source }
    }

    /// Resolve an expression to a string value, `None` when unresolved.
    ///
    /// Handles string literals directly, identifiers declared as string
    /// constants, and non-computed member chains (`A.B`, `A.B.C`, ...)
    /// through nested object-literal initializers. The `Object.freeze`
    /// wrapper is unwrapped transparently at the declaration and at any
    /// nested property value. Never returns a partial value.
    pub fn resolve_string(&self, expr: &Node<'tree>) -> Option<String> {
        match expr.kind() {
            "string" => string_literal_value(expr, self.source),
            "identifier" => {
                let init = self
                    .lookup
                    .resolve_declaration(node_text(expr, self.source))?;
                string_literal_value(&init, self.source)
            }
            "member_expression" => self.resolve_member_chain(expr),
            // computed access (subscript_expression), template strings,
            // call results: unresolved
            _ => None,
        }
    }

    /// Resolve an expression to an object literal: the literal itself, a
    /// frozen literal, or an identifier declared as either. Used for
    /// properties arguments passed by reference.
    pub fn resolve_object_literal(&self, expr: &Node<'tree>) -> Option<Node<'tree>> {
        match expr.kind() {
            "object" | "call_expression" => unwrap_frozen_object(expr, self.source),
            "identifier" => {
                let init = self
                    .lookup
                    .resolve_declaration(node_text(expr, self.source))?;
                unwrap_frozen_object(&init, self.source)
            }
            _ => None,
        }
    }

    fn resolve_member_chain(&self, expr: &Node<'tree>) -> Option<String> {
        // collect property segments from the chain, leftmost segment first
        let mut segments: Vec<String> = Vec::new();
        let mut current = *expr;

        let root = loop {
            match current.kind() {
                "member_expression" => {
                    let property = current.child_by_field_name("property")?;
                    if property.kind() != "property_identifier" {
                        return None;
                    }
                    segments.push(node_text(&property, self.source).to_string());
                    current = current.child_by_field_name("object")?;
                }
                "identifier" => break current,
                _ => return None,
            }
        };
        segments.reverse();

        let init = self
            .lookup
            .resolve_declaration(node_text(&root, self.source))?;
        let mut object = unwrap_frozen_object(&init, self.source)?;

        let last = segments.len() - 1;
        for (idx, segment) in segments.iter().enumerate() {
            let value = object_property_value(&object, segment, self.source)?;
            if idx == last {
                return string_literal_value(&value, self.source);
            }
            object = unwrap_frozen_object(&value, self.source)?;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;

    struct Fixture {
        tree: tree_sitter::Tree,
        source: String,
    }

    impl Fixture {
        fn parse(source: &str) -> Self {
            let mut parser = tree_sitter::Parser::new();
            parser
                .set_language(&Lang::JavaScript.tree_sitter_language())
                .unwrap();
            Self {
                tree: parser.parse(source, None).unwrap(),
                source: source.to_string(),
            }
        }

        /// The event-name argument of the last call expression in the file
        fn last_call_first_arg(&self) -> Node<'_> {
            let mut last = None;
            visit_all(&self.tree.root_node(), |n| {
                if n.kind() == "call_expression" {
                    last = Some(*n);
                }
            });
            let arguments = last.unwrap().child_by_field_name("arguments").unwrap();
            let mut cursor = arguments.walk();
            let arg = arguments.named_children(&mut cursor).next().unwrap();
            arg
        }

        fn resolve(&self) -> Option<String> {
            let root = self.tree.root_node();
            let index = ScopeIndex::build(&root, &self.source);
            let resolver = ConstantResolver::new(&index, &self.source);
            resolver.resolve_string(&self.last_call_first_arg())
        }
    }

    #[test]
    fn test_literal_resolves_directly() {
        let fixture = Fixture::parse("track('signup');");
        assert_eq!(fixture.resolve().unwrap(), "signup");
    }

    #[test]
    fn test_identifier_string_constant() {
        let fixture = Fixture::parse("const EVENT = 'signup';\ntrack(EVENT);");
        assert_eq!(fixture.resolve().unwrap(), "signup");
    }

    #[test]
    fn test_plain_object_constant() {
        let fixture = Fixture::parse(
            "const EVENTS = { SIGNUP: 'user_signup' };\ntrack(EVENTS.SIGNUP);",
        );
        assert_eq!(fixture.resolve().unwrap(), "user_signup");
    }

    #[test]
    fn test_frozen_object_resolves_like_plain() {
        let fixture = Fixture::parse(
            "const EVENTS = Object.freeze({ SIGNUP: 'user_signup' });\ntrack(EVENTS.SIGNUP);",
        );
        assert_eq!(fixture.resolve().unwrap(), "user_signup");
    }

    #[test]
    fn test_nested_object_chain() {
        let fixture = Fixture::parse(
            "const EVENTS = { checkout: { DONE: 'checkout_done' } };\ntrack(EVENTS.checkout.DONE);",
        );
        assert_eq!(fixture.resolve().unwrap(), "checkout_done");
    }

    #[test]
    fn test_nested_frozen_object_chain() {
        let fixture = Fixture::parse(
            "const EVENTS = Object.freeze({ checkout: Object.freeze({ DONE: 'checkout_done' }) });\ntrack(EVENTS.checkout.DONE);",
        );
        assert_eq!(fixture.resolve().unwrap(), "checkout_done");
    }

    #[test]
    fn test_call_in_chain_never_resolves() {
        // the declaration is produced by an arbitrary call, not a literal
        let fixture = Fixture::parse(
            "const EVENTS = buildEvents({ SIGNUP: 'user_signup' });\ntrack(EVENTS.SIGNUP);",
        );
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_unknown_identifier_unresolved() {
        let fixture = Fixture::parse("track(SOMEWHERE_ELSE.SIGNUP);");
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_computed_access_unresolved() {
        let fixture = Fixture::parse(
            "const EVENTS = { SIGNUP: 'user_signup' };\ntrack(EVENTS['SIGNUP']);",
        );
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_non_string_leaf_unresolved() {
        let fixture =
            Fixture::parse("const EVENTS = { COUNT: 42 };\ntrack(EVENTS.COUNT);");
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_missing_key_unresolved() {
        let fixture = Fixture::parse(
            "const EVENTS = { SIGNUP: 'user_signup' };\ntrack(EVENTS.LOGIN);",
        );
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_let_binding_not_indexed() {
        let fixture = Fixture::parse("let EVENT = 'signup';\ntrack(EVENT);");
        assert_eq!(fixture.resolve(), None);
    }

    #[test]
    fn test_resolve_object_literal_through_identifier() {
        let source = "const PROPS = { plan: 'pro' };\ntrack(PROPS);";
        let fixture = Fixture::parse(source);
        let root = fixture.tree.root_node();
        let index = ScopeIndex::build(&root, &fixture.source);
        let resolver = ConstantResolver::new(&index, &fixture.source);

        let arg = fixture.last_call_first_arg();
        let object = resolver.resolve_object_literal(&arg).unwrap();
        assert_eq!(object.kind(), "object");
    }
}
