//! Effective bilateral relations.

use pressure_events::{KingdomId, Tick};

use crate::realm::Realm;
use crate::store::EventStore;

pub const RELATION_MIN: f64 = -100.0;
pub const RELATION_MAX: f64 = 100.0;

pub fn clamp_relation(value: f64) -> f64 {
    value.clamp(RELATION_MIN, RELATION_MAX)
}

/// Combines a stored base relation with the evaluator's own pressure.
///
/// Only events held by `from` count: global relation entries always,
/// causer-only entries when their causer is `to`. A player looking at an
/// AI kingdom it has not discovered sees the raw base value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationEvaluator;

impl RelationEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn effective_relation<R: Realm + ?Sized>(
        &self,
        store: &EventStore,
        realm: &R,
        base: f64,
        from: Option<KingdomId>,
        to: Option<KingdomId>,
        now: Tick,
    ) -> f64 {
        let (Some(from), Some(to)) = (from, to) else {
            return clamp_relation(base);
        };

        if realm.is_player(from) && realm.is_ai(to) && !store.is_known_ai(to) {
            return base;
        }

        let pressure: f64 = store
            .events(from)
            .iter()
            .filter(|e| e.is_active(now))
            .map(|e| e.relation_delta_toward(to))
            .sum();

        clamp_relation(base + pressure)
    }

    /// Effective relation using the realm's stored base for the pair.
    pub fn relation_between<R: Realm + ?Sized>(
        &self,
        store: &EventStore,
        realm: &R,
        from: KingdomId,
        to: KingdomId,
        now: Tick,
    ) -> f64 {
        let base = realm.relation(from, to);
        self.effective_relation(store, realm, base, Some(from), Some(to), now)
    }
}
