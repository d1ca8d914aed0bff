//! Caller-supplied custom tracking function signatures
//!
//! A signature names a non-standard tracking function (dotted paths
//! allowed, e.g. `CustomModule.track`) and flags which positional argument
//! carries the event name and which carries the properties object. The CLI
//! accepts the compact string form `name(userId, EVENT_NAME, PROPERTIES)`.

use regex::Regex;
use tree_sitter::Node;

use crate::ast::node_text;
use crate::error::{Result, TrackScanError};

/// One positional parameter of a custom tracking function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomParameter {
    pub name: String,
    pub is_event_name: bool,
    pub is_properties: bool,
}

impl CustomParameter {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_event_name: false,
            is_properties: false,
        }
    }

    pub fn event_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_event_name: true,
            is_properties: false,
        }
    }

    pub fn properties(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_event_name: false,
            is_properties: true,
        }
    }
}

/// A validated custom tracking function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFunctionSignature {
    function_name: String,
    parameters: Vec<CustomParameter>,
    event_index: usize,
    properties_index: usize,
}

impl CustomFunctionSignature {
    /// Build a signature from structured parameters.
    ///
    /// At most one parameter may be flagged as the event name and at most
    /// one as the properties object; violating either is a fatal validation
    /// error surfaced before scanning. An empty parameter list gets the
    /// legacy positions: event name first, properties second. When no
    /// parameter is flagged as properties, the position after the last
    /// parameter is assumed (a call may simply not pass one).
    pub fn new(function_name: &str, parameters: Vec<CustomParameter>) -> Result<Self> {
        let event_flags = parameters.iter().filter(|p| p.is_event_name).count();
        if event_flags > 1 {
            return Err(TrackScanError::InvalidSignature {
                message: format!(
                    "'{}' flags {} parameters as the event name, expected at most one",
                    function_name, event_flags
                ),
            });
        }
        let property_flags = parameters.iter().filter(|p| p.is_properties).count();
        if property_flags > 1 {
            return Err(TrackScanError::InvalidSignature {
                message: format!(
                    "'{}' flags {} parameters as properties, expected at most one",
                    function_name, property_flags
                ),
            });
        }

        let (event_index, properties_index) = if parameters.is_empty() {
            (0, 1)
        } else {
            let event_index = parameters
                .iter()
                .position(|p| p.is_event_name)
                .ok_or_else(|| TrackScanError::InvalidSignature {
                    message: format!("'{}' has no parameter flagged as the event name", function_name),
                })?;
            let properties_index = parameters
                .iter()
                .position(|p| p.is_properties)
                .unwrap_or(parameters.len());
            (event_index, properties_index)
        };

        Ok(Self {
            function_name: function_name.to_string(),
            parameters,
            event_index,
            properties_index,
        })
    }

    /// Parse the compact string form: `name`, or
    /// `name(userId, EVENT_NAME, PROPERTIES)`.
    ///
    /// `EVENT_NAME` marks the event-name argument and is required when a
    /// parameter list is given; `PROPERTIES` marks the properties argument
    /// and defaults to the position after the last named parameter. The
    /// marker comparison is case-insensitive.
    pub fn parse(signature: &str) -> Result<Self> {
        let pattern = Regex::new(r"^\s*([A-Za-z0-9_$.]+)\s*(?:\(([^)]*)\))?\s*$")
            .map_err(|e| TrackScanError::InvalidSignature {
                message: e.to_string(),
            })?;

        let captures = pattern
            .captures(signature)
            .ok_or_else(|| TrackScanError::InvalidSignature {
                message: format!("cannot parse '{}'", signature),
            })?;

        let function_name = captures
            .get(1)
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        let Some(params_part) = captures.get(2) else {
            return Self::new(function_name, Vec::new());
        };

        let parameters: Vec<CustomParameter> = params_part
            .as_str()
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| match p.to_uppercase().as_str() {
                "EVENT_NAME" => CustomParameter::event_name(p),
                "PROPERTIES" => CustomParameter::properties(p),
                _ => CustomParameter::named(p),
            })
            .collect();

        if !parameters.iter().any(|p| p.is_event_name) {
            return Err(TrackScanError::InvalidSignature {
                message: format!("'{}' is missing the EVENT_NAME parameter", signature.trim()),
            });
        }

        Self::new(function_name, parameters)
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Positional index of the event-name argument
    pub fn event_index(&self) -> usize {
        self.event_index
    }

    /// Positional index of the properties argument
    pub fn properties_index(&self) -> usize {
        self.properties_index
    }

    /// Parameters that are neither the event name nor the properties object,
    /// with their positional indices; their arguments are captured as extra
    /// event properties keyed by parameter name.
    pub fn extra_parameters(&self) -> impl Iterator<Item = (usize, &str)> {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(idx, p)| {
                !p.is_event_name && !p.is_properties && *idx != self.properties_index
            })
            .map(|(idx, p)| (idx, p.name.as_str()))
    }

    /// Whether a callee expression invokes this signature's function.
    ///
    /// Bare names match a plain identifier callee. Dotted names match a
    /// member-expression chain of the same length, checked right-to-left
    /// from the method name back to the root identifier.
    pub fn matches_callee(&self, callee: &Node, source: &str) -> bool {
        let parts: Vec<&str> = self.function_name.split('.').collect();

        if parts.len() == 1 {
            return callee.kind() == "identifier" && node_text(callee, source) == parts[0];
        }

        if callee.kind() != "member_expression" {
            return false;
        }

        let mut current = *callee;
        let mut idx = parts.len() - 1;

        loop {
            match current.kind() {
                "member_expression" => {
                    let Some(property) = current.child_by_field_name("property") else {
                        return false;
                    };
                    if property.kind() != "property_identifier"
                        || node_text(&property, source) != parts[idx]
                    {
                        return false;
                    }
                    let Some(object) = current.child_by_field_name("object") else {
                        return false;
                    };
                    if idx == 0 {
                        // chain is longer than the dotted name
                        return false;
                    }
                    current = object;
                    idx -= 1;
                }
                "identifier" => {
                    return idx == 0 && node_text(&current, source) == parts[0];
                }
                _ => return false,
            }
        }
    }
}

/// Parse and validate a list of string-form signatures from the CLI
pub fn parse_signatures(raw: &[String]) -> Result<Vec<CustomFunctionSignature>> {
    raw.iter().map(|s| CustomFunctionSignature::parse(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;

    fn first_callee(source: &str) -> (tree_sitter::Tree, String) {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&Lang::JavaScript.tree_sitter_language())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        (tree, source.to_string())
    }

    fn callee_of<'tree>(tree: &'tree tree_sitter::Tree) -> Node<'tree> {
        let mut found = None;
        crate::ast::visit_all(&tree.root_node(), |n| {
            if found.is_none() && n.kind() == "call_expression" {
                found = Some(*n);
            }
        });
        found.unwrap().child_by_field_name("function").unwrap()
    }

    #[test]
    fn test_parse_bare_name() {
        let sig = CustomFunctionSignature::parse("customTrack").unwrap();
        assert_eq!(sig.function_name(), "customTrack");
        assert_eq!(sig.event_index(), 0);
        assert_eq!(sig.properties_index(), 1);
        assert_eq!(sig.extra_parameters().count(), 0);
    }

    #[test]
    fn test_parse_with_parameters() {
        let sig =
            CustomFunctionSignature::parse("track(userId, EVENT_NAME, PROPERTIES)").unwrap();
        assert_eq!(sig.event_index(), 1);
        assert_eq!(sig.properties_index(), 2);
        let extras: Vec<_> = sig.extra_parameters().collect();
        assert_eq!(extras, vec![(0, "userId")]);
    }

    #[test]
    fn test_parse_properties_defaults_past_end() {
        let sig = CustomFunctionSignature::parse("trackUserEvent(EVENT_NAME)").unwrap();
        assert_eq!(sig.event_index(), 0);
        assert_eq!(sig.properties_index(), 1);
    }

    #[test]
    fn test_parse_trailing_extras() {
        let sig = CustomFunctionSignature::parse(
            "track4(userId, EVENT_NAME, userAddress, PROPERTIES, userEmail)",
        )
        .unwrap();
        assert_eq!(sig.event_index(), 1);
        assert_eq!(sig.properties_index(), 3);
        let extras: Vec<_> = sig.extra_parameters().collect();
        assert_eq!(extras, vec![(0, "userId"), (2, "userAddress"), (4, "userEmail")]);
    }

    #[test]
    fn test_parse_missing_event_name_rejected() {
        let result = CustomFunctionSignature::parse("track(userId, PROPERTIES)");
        assert!(matches!(
            result,
            Err(TrackScanError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_two_event_name_flags_rejected() {
        let result = CustomFunctionSignature::new(
            "track",
            vec![
                CustomParameter::event_name("a"),
                CustomParameter::event_name("b"),
            ],
        );
        assert!(matches!(
            result,
            Err(TrackScanError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_two_properties_flags_rejected() {
        let result = CustomFunctionSignature::new(
            "track",
            vec![
                CustomParameter::event_name("name"),
                CustomParameter::properties("a"),
                CustomParameter::properties("b"),
            ],
        );
        assert!(matches!(
            result,
            Err(TrackScanError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_matches_bare_identifier() {
        let sig = CustomFunctionSignature::parse("customTrack").unwrap();
        let (tree, source) = first_callee("customTrack('evt', {});");
        assert!(sig.matches_callee(&callee_of(&tree), &source));

        let (other_tree, other_source) = first_callee("otherTrack('evt', {});");
        assert!(!sig.matches_callee(&callee_of(&other_tree), &other_source));
    }

    #[test]
    fn test_matches_dotted_chain() {
        let sig =
            CustomFunctionSignature::parse("CustomModule.track(userId, EVENT_NAME, PROPERTIES)")
                .unwrap();

        let (tree, source) = first_callee("CustomModule.track('u', 'evt', {});");
        assert!(sig.matches_callee(&callee_of(&tree), &source));

        // wrong root object
        let (wrong, wrong_src) = first_callee("OtherModule.track('u', 'evt', {});");
        assert!(!sig.matches_callee(&callee_of(&wrong), &wrong_src));

        // chain longer than the dotted name
        let (long, long_src) = first_callee("app.CustomModule.track('u', 'evt', {});");
        assert!(!sig.matches_callee(&callee_of(&long), &long_src));
    }

    #[test]
    fn test_bare_name_does_not_match_member_call() {
        let sig = CustomFunctionSignature::parse("track").unwrap();
        let (tree, source) = first_callee("analytics.track('evt', {});");
        assert!(!sig.matches_callee(&callee_of(&tree), &source));
    }
}
