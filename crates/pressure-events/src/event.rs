//! Pressure Event Types
//!
//! Time-boxed effects registered against a kingdom, and per-agent order locks.

use serde::{Deserialize, Serialize};

use crate::effect::{Effects, RelationScope, Stat};
use crate::ids::{EventId, KingdomId, Tick, TypeId};

/// A time-boxed bundle of effects applied to one kingdom (the causee).
///
/// Events are immutable once created. They leave the store only by expiry
/// or administrative removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureEvent {
    pub id: EventId,
    pub type_id: TypeId,
    /// Kingdom responsible for the event; `None` for world events
    #[serde(default)]
    pub causer: Option<KingdomId>,
    /// Kingdom affected by the event
    pub causee: KingdomId,
    pub start: Tick,
    /// Exclusive end: the event is active while `now < end`
    pub end: Tick,
    #[serde(default)]
    pub effects: Effects,
    #[serde(default)]
    pub scope: RelationScope,
}

impl PressureEvent {
    pub fn is_active(&self, now: Tick) -> bool {
        now < self.end
    }

    pub fn is_expired(&self, now: Tick) -> bool {
        !self.is_active(now)
    }

    pub fn effect(&self, stat: Stat) -> f64 {
        self.effects.get(stat)
    }

    pub fn was_caused_by(&self, kingdom: KingdomId) -> bool {
        self.causer == Some(kingdom)
    }

    /// Relation delta this event contributes when its causee evaluates `counterpart`.
    pub fn relation_delta_toward(&self, counterpart: KingdomId) -> f64 {
        match self.scope {
            RelationScope::Global => self.effect(Stat::Relations),
            RelationScope::CauserOnly if self.was_caused_by(counterpart) => {
                self.effect(Stat::Relations)
            }
            RelationScope::CauserOnly => 0.0,
        }
    }

    /// Ticks left before expiry (0 once expired).
    pub fn remaining(&self, now: Tick) -> Tick {
        self.end.saturating_sub(now)
    }
}

/// Marks an agent as busy with one outstanding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLock {
    pub end: Tick,
    pub event_id: EventId,
    pub type_id: TypeId,
}

impl EntityLock {
    pub fn is_active(&self, now: Tick) -> bool {
        now < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(scope: RelationScope, causer: Option<KingdomId>) -> PressureEvent {
        PressureEvent {
            id: EventId(1),
            type_id: TypeId::from("insult_received"),
            causer,
            causee: KingdomId(1),
            start: 100,
            end: 200,
            effects: Effects::new().with(Stat::Relations, -8.0),
            scope,
        }
    }

    #[test]
    fn test_activity_window_is_end_exclusive() {
        let event = sample(RelationScope::Global, None);
        assert!(event.is_active(199));
        assert!(event.is_expired(200));
        assert_eq!(event.remaining(150), 50);
        assert_eq!(event.remaining(250), 0);
    }

    #[test]
    fn test_causer_only_relation_delta() {
        let event = sample(RelationScope::CauserOnly, Some(KingdomId(2)));
        assert_eq!(event.relation_delta_toward(KingdomId(2)), -8.0);
        assert_eq!(event.relation_delta_toward(KingdomId(3)), 0.0);
    }

    #[test]
    fn test_global_relation_delta() {
        let event = sample(RelationScope::Global, Some(KingdomId(2)));
        assert_eq!(event.relation_delta_toward(KingdomId(3)), -8.0);
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"id":5,"type_id":"drought","causee":3,"start":0,"end":10}"#;
        let event: PressureEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.causer, None);
        assert!(event.effects.is_empty());
        assert_eq!(event.scope, RelationScope::Global);
    }
}
