//! Call-site classification and event extraction
//!
//! Classifies every call expression in a parsed file against the custom
//! function signatures and the provider registry, and extracts the event
//! name, property shapes, and location for each match. Classification is
//! ordered and first-match-wins: custom signatures are checked before
//! built-in providers so callers can override built-in-looking names.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::ast::{line_number, node_text, object_property_value, visit_all};
use crate::custom::CustomFunctionSignature;
use crate::functions::enclosing_function_name;
use crate::properties::{extract_properties, infer_value_type, property_for_value};
use crate::providers::{
    ArgumentRule, ProviderDescriptor, ProviderRegistry, CUSTOM_PROVIDER, GTM_PROVIDER,
};
use crate::resolve::{ConstantResolver, ScopeIndex};
use crate::schema::{EventProperty, PropertyMap};

/// One extracted tracking call, before merging into the events map
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub event_name: String,
    pub destination: String,
    pub properties: PropertyMap,
    /// File path relative to the scan root
    pub path: String,
    /// 1-based line number
    pub line: usize,
    /// Enclosing function name, `None` at top level
    pub function: Option<String>,
}

/// Scan a parsed file for tracking calls.
///
/// Builds the file's constant index once, visits every call expression, and
/// returns the matched call sites in source order. Identical call sites
/// (same destination, event, line, and enclosing function) are reported
/// once.
pub fn scan_tree(
    root: &Node,
    source: &str,
    rel_path: &str,
    registry: &ProviderRegistry,
    custom_signatures: &[CustomFunctionSignature],
) -> Vec<CallSite> {
    let scope = ScopeIndex::build(root, source);
    let resolver = ConstantResolver::new(&scope, source);

    let mut calls: Vec<Node> = Vec::new();
    visit_all(root, |node| {
        if node.kind() == "call_expression" {
            calls.push(*node);
        }
    });

    let mut seen: HashSet<(String, String, usize, Option<String>)> = HashSet::new();
    let mut sites = Vec::new();

    for call in calls {
        let Some(extracted) = classify_call(&call, source, registry, custom_signatures, &resolver)
        else {
            continue;
        };

        let line = line_number(&call);
        let function = enclosing_function_name(&call, source);

        let key = (
            extracted.destination.clone(),
            extracted.event_name.clone(),
            line,
            function.clone(),
        );
        if !seen.insert(key) {
            continue;
        }

        sites.push(CallSite {
            event_name: extracted.event_name,
            destination: extracted.destination,
            properties: extracted.properties,
            path: rel_path.to_string(),
            line,
            function,
        });
    }

    sites
}

struct ExtractedEvent {
    event_name: String,
    destination: String,
    properties: PropertyMap,
}

/// Ordered classification of one call expression. Returns `None` for
/// anything that is not a tracking call, including malformed nodes with no
/// recognizable callee.
fn classify_call<'tree>(
    call: &Node<'tree>,
    source: &str,
    registry: &ProviderRegistry,
    custom_signatures: &[CustomFunctionSignature],
    resolver: &ConstantResolver<'_, 'tree>,
) -> Option<ExtractedEvent> {
    let callee = call.child_by_field_name("function")?;
    let arguments = call_arguments(call);

    // 1. custom signatures take precedence over built-in providers
    for signature in custom_signatures {
        if signature.matches_callee(&callee, source) {
            return extract_custom(signature, &arguments, source, resolver);
        }
    }

    // 2. dataLayer.push({...}) is a distinct shape, matched outside the
    //    general callee algorithm
    if is_data_layer_push(&callee, source) {
        return extract_data_layer(&arguments, source, resolver);
    }

    // 3. function-based providers (bare identifier callee)
    if callee.kind() == "identifier" {
        let descriptor = registry.by_function(node_text(&callee, source))?;
        return extract_provider(descriptor, &arguments, source, resolver);
    }

    // 4. member-based providers
    if callee.kind() == "member_expression" {
        let (object_name, method_name) = member_call_names(&callee, source)?;
        let descriptor = registry.by_member(&object_name, &method_name)?;
        return extract_provider(descriptor, &arguments, source, resolver);
    }

    None
}

/// Named argument nodes of a call expression, in order
fn call_arguments<'tree>(call: &Node<'tree>) -> Vec<Node<'tree>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    arguments.named_children(&mut cursor).collect()
}

/// Object and method names of a member-expression callee.
///
/// The object name is the object identifier, or for exactly one extra level
/// of nesting (`window.DD_RUM.addAction`) the object's own property name.
/// Deeper chains are unresolved and never match a provider.
fn member_call_names(callee: &Node, source: &str) -> Option<(String, String)> {
    let property = callee.child_by_field_name("property")?;
    if property.kind() != "property_identifier" {
        return None;
    }
    let method_name = node_text(&property, source).to_string();

    let object = callee.child_by_field_name("object")?;
    let object_name = match object.kind() {
        "identifier" => node_text(&object, source).to_string(),
        "member_expression" => {
            let inner_object = object.child_by_field_name("object")?;
            if inner_object.kind() != "identifier" {
                return None;
            }
            let inner_property = object.child_by_field_name("property")?;
            if inner_property.kind() != "property_identifier" {
                return None;
            }
            node_text(&inner_property, source).to_string()
        }
        _ => return None,
    };

    Some((object_name, method_name))
}

/// `dataLayer.push(...)` or `window.dataLayer.push(...)`
fn is_data_layer_push(callee: &Node, source: &str) -> bool {
    match member_call_names(callee, source) {
        Some((object, method)) => object == "dataLayer" && method == "push",
        None => false,
    }
}

fn extract_provider<'tree>(
    descriptor: &ProviderDescriptor,
    arguments: &[Node<'tree>],
    source: &str,
    resolver: &ConstantResolver<'_, 'tree>,
) -> Option<ExtractedEvent> {
    match descriptor.args {
        ArgumentRule::Positional {
            event,
            props,
            min_args,
        } => {
            if arguments.len() < min_args {
                return None;
            }
            // unresolved event names drop the call site entirely
            let event_name = resolve_event_name(resolver, &arguments[event])?;
            let properties = arguments
                .get(props)
                .map(|node| properties_from_arg(node, source, resolver))
                .unwrap_or_default();

            Some(ExtractedEvent {
                event_name,
                destination: descriptor.name.to_string(),
                properties,
            })
        }
        ArgumentRule::StructEvent => extract_struct_event(descriptor, arguments, source, resolver),
    }
}

/// Snowplow's `tracker.track(buildStructEvent({ action: ..., ... }))`:
/// the struct's `action` key names the event and is removed from the
/// property set.
fn extract_struct_event<'tree>(
    descriptor: &ProviderDescriptor,
    arguments: &[Node<'tree>],
    source: &str,
    resolver: &ConstantResolver<'_, 'tree>,
) -> Option<ExtractedEvent> {
    let builder_call = arguments.first()?;
    if builder_call.kind() != "call_expression" {
        return None;
    }
    let builder = builder_call.child_by_field_name("function")?;
    if builder.kind() != "identifier" || node_text(&builder, source) != "buildStructEvent" {
        return None;
    }

    let inner_args = call_arguments(builder_call);
    let struct_object = inner_args.first()?;
    if struct_object.kind() != "object" {
        return None;
    }

    let action = object_property_value(struct_object, "action", source)?;
    let event_name = resolve_event_name(resolver, &action)?;

    let mut properties = extract_properties(struct_object, source);
    properties.remove("action");

    Some(ExtractedEvent {
        event_name,
        destination: descriptor.name.to_string(),
        properties,
    })
}

/// GTM data-layer push: the sole object-literal argument must contain an
/// `event` key with a resolvable string value; all other keys become
/// properties.
fn extract_data_layer<'tree>(
    arguments: &[Node<'tree>],
    source: &str,
    resolver: &ConstantResolver<'_, 'tree>,
) -> Option<ExtractedEvent> {
    let payload = arguments.first()?;
    if payload.kind() != "object" {
        return None;
    }

    let event_value = object_property_value(payload, "event", source)?;
    let event_name = resolve_event_name(resolver, &event_value)?;

    let mut properties = extract_properties(payload, source);
    properties.remove("event");

    Some(ExtractedEvent {
        event_name,
        destination: GTM_PROVIDER.to_string(),
        properties,
    })
}

fn extract_custom<'tree>(
    signature: &CustomFunctionSignature,
    arguments: &[Node<'tree>],
    source: &str,
    resolver: &ConstantResolver<'_, 'tree>,
) -> Option<ExtractedEvent> {
    let event_arg = arguments.get(signature.event_index())?;
    let event_name = resolve_event_name(resolver, event_arg)?;

    let mut properties = arguments
        .get(signature.properties_index())
        .map(|node| properties_from_arg(node, source, resolver))
        .unwrap_or_default();

    // parameters that are neither event name nor properties are captured as
    // extra properties keyed by parameter name
    for (idx, name) in signature.extra_parameters() {
        let Some(arg) = arguments.get(idx) else {
            continue;
        };
        let shape = if let Some(object) = resolver.resolve_object_literal(arg) {
            property_for_value(&object, source)
        } else {
            EventProperty::of_type(infer_value_type(arg))
        };
        properties.insert(name, shape);
    }

    Some(ExtractedEvent {
        event_name,
        destination: CUSTOM_PROVIDER.to_string(),
        properties,
    })
}

/// Resolve the event-name argument; an empty string is never a usable
/// event name.
fn resolve_event_name<'tree>(
    resolver: &ConstantResolver<'_, 'tree>,
    node: &Node<'tree>,
) -> Option<String> {
    resolver.resolve_string(node).filter(|name| !name.is_empty())
}

/// Property map from a properties argument: an object literal directly, or
/// an identifier declared as a (possibly frozen) object literal.
fn properties_from_arg<'tree>(
    node: &Node<'tree>,
    source: &str,
    resolver: &ConstantResolver<'_, 'tree>,
) -> PropertyMap {
    match resolver.resolve_object_literal(node) {
        Some(object) => extract_properties(&object, source),
        None => PropertyMap::new(),
    }
}
