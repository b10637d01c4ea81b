//! Snapshot Types
//!
//! The persisted shape of the pressure store. Every field is optional on
//! load: a missing or unreadable field becomes an empty collection instead
//! of failing the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::event::{EntityLock, PressureEvent};
use crate::ids::{AgentId, EventId, KingdomId, Tick};

/// Persisted state of the pressure store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureSnapshot {
    #[serde(default)]
    pub events_by_kingdom: BTreeMap<KingdomId, Vec<PressureEvent>>,
    #[serde(default)]
    pub known_ai: BTreeSet<KingdomId>,
    #[serde(default)]
    pub entity_locks: BTreeMap<AgentId, EntityLock>,
    /// Last tick the store swept before the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<Tick>,
}

impl PressureSnapshot {
    /// Parses a snapshot, defaulting each field that is missing or malformed.
    ///
    /// Only a document that is not a JSON object at all is an error.
    pub fn from_json_lenient(content: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Ok(Self {
            events_by_kingdom: field_or_default(&value, "events_by_kingdom"),
            known_ai: field_or_default(&value, "known_ai"),
            entity_locks: field_or_default(&value, "entity_locks"),
            last_tick: field_or_default(&value, "last_tick"),
        })
    }

    /// Serializes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of stored events across all kingdoms.
    pub fn event_count(&self) -> usize {
        self.events_by_kingdom.values().map(Vec::len).sum()
    }

    /// Largest event id referenced by events or locks.
    pub fn max_event_id(&self) -> Option<EventId> {
        let from_events = self
            .events_by_kingdom
            .values()
            .flatten()
            .map(|e| e.id);
        let from_locks = self.entity_locks.values().map(|l| l.event_id);
        from_events.chain(from_locks).max()
    }
}

fn field_or_default<T: DeserializeOwned + Default>(value: &serde_json::Value, key: &str) -> T {
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_loads_empty() {
        let snapshot = PressureSnapshot::from_json_lenient("{}").unwrap();
        assert_eq!(snapshot, PressureSnapshot::default());
    }

    #[test]
    fn test_corrupt_field_defaults() {
        let json = r#"{
            "events_by_kingdom": "not a map",
            "known_ai": [2, 3]
        }"#;
        let snapshot = PressureSnapshot::from_json_lenient(json).unwrap();
        assert!(snapshot.events_by_kingdom.is_empty());
        assert_eq!(snapshot.known_ai.len(), 2);
        assert!(snapshot.entity_locks.is_empty());
    }

    #[test]
    fn test_last_tick_is_optional() {
        let snapshot = PressureSnapshot::from_json_lenient(r#"{"last_tick": 1200}"#).unwrap();
        assert_eq!(snapshot.last_tick, Some(1200));

        let json = PressureSnapshot::default().to_json().unwrap();
        assert!(!json.contains("last_tick"));
    }

    #[test]
    fn test_non_json_is_error() {
        assert!(PressureSnapshot::from_json_lenient("not json").is_err());
    }

    #[test]
    fn test_max_event_id_includes_locks() {
        let mut snapshot = PressureSnapshot::default();
        snapshot.entity_locks.insert(
            AgentId(9),
            EntityLock {
                end: 50,
                event_id: EventId(77),
                type_id: "gift_sent".into(),
            },
        );
        assert_eq!(snapshot.max_event_id(), Some(EventId(77)));
    }
}
