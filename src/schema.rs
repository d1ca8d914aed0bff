//! Data model for the emitted tracking schema document

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Current schema version for output stability
pub const SCHEMA_VERSION: u32 = 1;

/// A single property observed on a tracked event
///
/// `prop_type` is inferred from the argument expression at the call site
/// (`string`, `number`, `boolean`, `array`, `object`, or `any` when the
/// value is not a literal). Object-typed values carry their nested shape in
/// `properties`; array-typed values describe their element shape in `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub prop_type: Option<String>,

    /// Nested property shapes for object-typed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,

    /// Element shape for array-typed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<EventProperty>>,
}

impl EventProperty {
    /// Property with just an inferred type
    pub fn of_type(prop_type: &str) -> Self {
        Self {
            prop_type: Some(prop_type.to_string()),
            ..Self::default()
        }
    }
}

/// Insertion-ordered property map with first-seen-wins merge semantics
///
/// The emitted document must list properties in the order they were first
/// observed, and a property inferred at an earlier call site must not be
/// overwritten by a later sighting of the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, EventProperty)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property unless the key is already present (first-seen wins)
    pub fn insert(&mut self, key: &str, value: EventProperty) {
        if !self.contains_key(key) {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Insert or replace a property (used while building a single call site,
    /// where later duplicate keys in one object literal shadow earlier ones)
    pub fn insert_replace(&mut self, key: &str, value: EventProperty) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&EventProperty> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<EventProperty> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EventProperty)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Union another map into this one, keeping existing entries on conflict
    pub fn merge_first_seen(&mut self, other: PropertyMap) {
        for (key, value) in other.entries {
            if !self.contains_key(&key) {
                self.entries.push((key, value));
            }
        }
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property names to property shapes")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, EventProperty>()? {
                    entries.push((key, value));
                }
                Ok(PropertyMap { entries })
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}

/// One call site that produced an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// File path relative to the scan root
    pub path: String,

    /// 1-based line number of the call expression
    pub line: usize,

    /// Enclosing function name, omitted for top-level call sites
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Provider name when determinable (`custom` for custom functions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// A distinct event discovered during a scan
///
/// Created on first sighting of an event name; later call sites resolving to
/// the same name append to `implementations` and union into `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedEvent {
    /// Human description, filled by a downstream step (never by the detector)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub properties: PropertyMap,

    pub implementations: Vec<Implementation>,
}

/// Events keyed by name, iterated and serialized in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsMap {
    entries: Vec<(String, DetectedEvent)>,
}

impl EventsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DetectedEvent> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Fetch the event for `name`, creating it in insertion order if absent
    pub fn get_or_insert(&mut self, name: &str) -> &mut DetectedEvent {
        if let Some(idx) = self.entries.iter().position(|(k, _)| k == name) {
            return &mut self.entries[idx].1;
        }
        self.entries.push((name.to_string(), DetectedEvent::default()));
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DetectedEvent)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl Serialize for EventsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EventsMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EventsMapVisitor;

        impl<'de> Visitor<'de> for EventsMapVisitor {
            type Value = EventsMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of event names to detected events")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, DetectedEvent>()? {
                    entries.push((key, value));
                }
                Ok(EventsMap { entries })
            }
        }

        deserializer.deserialize_map(EventsMapVisitor)
    }
}

/// Metadata describing the scanned source tree
///
/// Fields are serialized even when unknown (as null) so consumers can rely
/// on the block's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoDetails {
    /// Repository URL, null when not a git checkout and not overridden
    pub repository: Option<String>,

    /// Commit hash at scan time
    pub commit: Option<String>,

    /// Scan or commit timestamp, RFC 3339
    pub timestamp: String,
}

/// The complete emitted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSchema {
    pub version: u32,
    pub source: RepoDetails,
    pub events: EventsMap,
}

impl TrackingSchema {
    pub fn new(events: EventsMap, source: RepoDetails) -> Self {
        Self {
            version: SCHEMA_VERSION,
            source,
            events,
        }
    }
}
