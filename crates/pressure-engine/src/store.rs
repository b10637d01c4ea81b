//! Event store.
//!
//! Owns every active pressure event (grouped by causee), the per-agent
//! order locks, and the set of AI kingdoms the player has discovered.

use std::collections::{BTreeMap, BTreeSet};

use pressure_events::{
    AgentId, Effects, EntityLock, EventId, KingdomId, PressureEvent, PressureSnapshot,
    RelationScope, Stat, Tick, TypeId,
};

use crate::resolver::{fold_mods, Mods};

/// What one expiry sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub events_removed: usize,
    pub locks_removed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.events_removed == 0 && self.locks_removed == 0
    }
}

/// Mutable home of all pressure state.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: BTreeMap<KingdomId, Vec<PressureEvent>>,
    locks: BTreeMap<AgentId, EntityLock>,
    known_ai: BTreeSet<KingdomId>,
    next_id: u64,
    /// Latest tick passed to [`EventStore::tick`]
    last_tick: Option<Tick>,
    dirty: bool,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            locks: BTreeMap::new(),
            known_ai: BTreeSet::new(),
            next_id: 1,
            last_tick: None,
            dirty: false,
        }
    }

    fn allocate_id(&mut self) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Registers a new event and returns its id.
    ///
    /// The event always lasts at least one tick, and negligible effect
    /// entries are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn add_event(
        &mut self,
        causer: Option<KingdomId>,
        causee: KingdomId,
        type_id: impl Into<TypeId>,
        effects: Effects,
        scope: RelationScope,
        now: Tick,
        duration: Tick,
    ) -> EventId {
        let id = self.allocate_id();
        let event = PressureEvent {
            id,
            type_id: type_id.into(),
            causer,
            causee,
            start: now,
            end: now.saturating_add(duration).max(now.saturating_add(1)),
            effects: effects.without_negligible(),
            scope,
        };

        tracing::trace!(
            "Registered {} ({}) on {} until {}",
            event.id,
            event.type_id,
            causee,
            event.end
        );

        self.events.entry(causee).or_default().push(event);
        self.dirty = true;
        id
    }

    /// Like [`add_event`](Self::add_event), but refuses to stack on an
    /// active match.
    ///
    /// Global events match on `(causee, type)`; causer-only events also
    /// match on the causer.
    #[allow(clippy::too_many_arguments)]
    pub fn try_add_event(
        &mut self,
        causer: Option<KingdomId>,
        causee: KingdomId,
        type_id: impl Into<TypeId>,
        effects: Effects,
        scope: RelationScope,
        now: Tick,
        duration: Tick,
    ) -> Option<EventId> {
        let type_id = type_id.into();
        let duplicate = match scope {
            RelationScope::Global => self.has_active_event(causee, type_id.as_str(), now),
            RelationScope::CauserOnly => self
                .active(causee, now)
                .any(|e| e.type_id == type_id && e.causer == causer),
        };
        if duplicate {
            return None;
        }
        Some(self.add_event(causer, causee, type_id, effects, scope, now, duration))
    }

    /// Shorthand for a global event carrying economy and happiness entries.
    #[allow(clippy::too_many_arguments)]
    pub fn add_economy_event(
        &mut self,
        causer: Option<KingdomId>,
        causee: KingdomId,
        type_id: impl Into<TypeId>,
        economy_pct: f64,
        happiness: f64,
        now: Tick,
        duration: Tick,
    ) -> EventId {
        let effects = Effects::new()
            .with(Stat::Economy, economy_pct)
            .with(Stat::Happiness, happiness);
        self.add_event(causer, causee, type_id, effects, RelationScope::Global, now, duration)
    }

    fn active(&self, kingdom: KingdomId, now: Tick) -> impl Iterator<Item = &PressureEvent> + '_ {
        self.events(kingdom).iter().filter(move |e| e.is_active(now))
    }

    pub fn has_active_event(&self, causee: KingdomId, type_id: &str, now: Tick) -> bool {
        self.active(causee, now).any(|e| e.type_id.as_str() == type_id)
    }

    pub fn has_active_by_causer(
        &self,
        causee: KingdomId,
        type_id: &str,
        causer: KingdomId,
        now: Tick,
    ) -> bool {
        self.active(causee, now)
            .any(|e| e.type_id.as_str() == type_id && e.was_caused_by(causer))
    }

    /// Aggregate modifiers of a kingdom's active events.
    pub fn get_mods(&self, kingdom: KingdomId, now: Tick) -> Mods {
        fold_mods(self.active(kingdom, now).flat_map(|e| e.effects.iter()))
    }

    /// Stored events of a kingdom, including expired ones not yet swept.
    pub fn events(&self, kingdom: KingdomId) -> &[PressureEvent] {
        self.events.get(&kingdom).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kingdoms that currently hold at least one stored event.
    pub fn kingdoms(&self) -> impl Iterator<Item = KingdomId> + '_ {
        self.events.keys().copied()
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// Removes expired events and locks.
    pub fn tick(&mut self, now: Tick) -> SweepReport {
        let mut report = SweepReport::default();
        self.last_tick = Some(self.last_tick.map_or(now, |last| last.max(now)));

        self.events.retain(|_, list| {
            let before = list.len();
            list.retain(|e| e.is_active(now));
            report.events_removed += before - list.len();
            !list.is_empty()
        });

        let before = self.locks.len();
        self.locks.retain(|_, lock| lock.is_active(now));
        report.locks_removed = before - self.locks.len();

        if !report.is_empty() {
            self.dirty = true;
            tracing::debug!(
                "Expiry at tick {}: {} events, {} locks",
                now,
                report.events_removed,
                report.locks_removed
            );
        }
        report
    }

    /// Removes one event regardless of its remaining lifetime.
    pub fn remove_event(&mut self, causee: KingdomId, event_id: EventId) -> bool {
        self.take_where(causee, |e| e.id == event_id) > 0
    }

    /// Removes every event of `causee` matching `pred`; returns how many.
    pub(crate) fn take_where<F>(&mut self, causee: KingdomId, mut pred: F) -> usize
    where
        F: FnMut(&PressureEvent) -> bool,
    {
        let Some(list) = self.events.get_mut(&causee) else {
            return 0;
        };
        let before = list.len();
        list.retain(|e| !pred(e));
        let removed = before - list.len();
        if list.is_empty() {
            self.events.remove(&causee);
        }
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Claims the single order slot of an agent.
    ///
    /// Fails if an active lock is held; an expired lock that has not been
    /// swept yet is overwritten.
    pub fn try_lock_entity(
        &mut self,
        agent: AgentId,
        event_id: EventId,
        type_id: impl Into<TypeId>,
        now: Tick,
        duration: Tick,
    ) -> bool {
        if self.is_entity_locked(agent, now) {
            return false;
        }
        self.locks.insert(
            agent,
            EntityLock {
                end: now.saturating_add(duration).max(now.saturating_add(1)),
                event_id,
                type_id: type_id.into(),
            },
        );
        self.dirty = true;
        true
    }

    pub fn is_entity_locked(&self, agent: AgentId, now: Tick) -> bool {
        self.locks.get(&agent).is_some_and(|l| l.is_active(now))
    }

    pub fn entity_lock(&self, agent: AgentId) -> Option<&EntityLock> {
        self.locks.get(&agent)
    }

    pub fn unlock_entity(&mut self, agent: AgentId) -> bool {
        let removed = self.locks.remove(&agent).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn mark_known_ai(&mut self, kingdom: KingdomId) {
        if self.known_ai.insert(kingdom) {
            self.dirty = true;
        }
    }

    pub fn is_known_ai(&self, kingdom: KingdomId) -> bool {
        self.known_ai.contains(&kingdom)
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.last_tick
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Copies the persistent state out.
    pub fn snapshot(&self) -> PressureSnapshot {
        PressureSnapshot {
            events_by_kingdom: self.events.clone(),
            known_ai: self.known_ai.clone(),
            entity_locks: self.locks.clone(),
            last_tick: self.last_tick,
        }
    }

    /// Replaces all state with a snapshot.
    ///
    /// New ids continue after the largest restored one. The store is clean
    /// afterwards.
    pub fn restore(&mut self, snapshot: PressureSnapshot) {
        self.next_id = snapshot.max_event_id().map_or(1, |id| id.0 + 1);
        self.events = snapshot
            .events_by_kingdom
            .into_iter()
            .filter(|(_, list)| !list.is_empty())
            .collect();
        self.known_ai = snapshot.known_ai;
        self.locks = snapshot.entity_locks;
        self.last_tick = snapshot.last_tick;
        self.dirty = false;
    }

    pub fn from_snapshot(snapshot: PressureSnapshot) -> Self {
        let mut store = Self::new();
        store.restore(snapshot);
        store
    }
}
