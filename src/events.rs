//! Merging per-file call sites into the canonical events map
//!
//! Dedup is by exact event-name match, never fuzzy. The first sighting of a
//! name creates the event; later sightings append their implementation and
//! union their properties, with the first-seen property shape winning on
//! conflict. Input order is file-scan order, so the emitted document is
//! deterministic for identical input.

use crate::matcher::CallSite;
use crate::schema::{EventsMap, Implementation};

/// Merge call sites into the events map, in arrival order
pub fn build_events_map(call_sites: Vec<CallSite>) -> EventsMap {
    let mut events = EventsMap::new();

    for site in call_sites {
        let event = events.get_or_insert(&site.event_name);
        event.properties.merge_first_seen(site.properties);
        event.implementations.push(Implementation {
            path: site.path,
            line: site.line,
            function: site.function,
            destination: Some(site.destination),
        });
    }

    events
}
