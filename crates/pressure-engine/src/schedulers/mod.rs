//! Pressure Schedulers
//!
//! Periodic, jittered, cooldown-gated sources of new pressure events. Each
//! scheduler walks its subjects once per engine tick; a subject that comes
//! due is rescheduled before anything else happens, then the cooldowns
//! decide whether it may fire.

pub mod gossip;
pub mod player;
pub mod world;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use pressure_events::{EventId, KingdomId, Tick, TypeId};

use crate::barks::BarkPools;
use crate::catalog::{EventTemplate, TemplateCatalog, HERALD_GROUP};
use crate::config::CadenceConfig;
use crate::realm::{InstantAdjustment, Realm};
use crate::store::EventStore;

pub use gossip::GossipScheduler;
pub use player::PlayerPressureScheduler;
pub use world::WorldEventScheduler;

/// Mutable engine state lent to schedulers and gateways for one call.
pub struct PressureCtx<'a> {
    pub store: &'a mut EventStore,
    pub catalog: &'a TemplateCatalog,
    pub barks: &'a BarkPools,
    pub rng: &'a mut SmallRng,
}

/// Announcement of a freshly registered pressure event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureNotice {
    /// Name of the scheduler that fired
    pub source: String,
    pub type_id: TypeId,
    pub causer: Option<KingdomId>,
    pub causee: KingdomId,
    pub event_id: EventId,
    /// Herald line for the causee, if the template names a pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bark: Option<String>,
}

/// A source of pressure events driven by the engine tick.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Walks every subject once and returns what fired.
    fn run(&mut self, ctx: &mut PressureCtx<'_>, realm: &mut dyn Realm, now: Tick) -> Vec<PressureNotice>;
}

/// Per-subject "next eligible tick" bookkeeping.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Tick,
    jitter: Tick,
    next_due: BTreeMap<KingdomId, Tick>,
}

impl Cadence {
    pub fn new(config: CadenceConfig) -> Self {
        Self {
            interval: config.interval,
            jitter: config.jitter,
            next_due: BTreeMap::new(),
        }
    }

    /// True if `subject` is due at `now`.
    ///
    /// A subject seen for the first time is only staggered into
    /// `[now, now + interval)` and never fires on that call. A due subject
    /// is rescheduled before returning.
    pub fn check<R: Rng + ?Sized>(&mut self, subject: KingdomId, now: Tick, rng: &mut R) -> bool {
        match self.next_due.get(&subject) {
            None => {
                let offset = if self.interval > 0 {
                    rng.gen_range(0..self.interval)
                } else {
                    0
                };
                self.next_due.insert(subject, now.saturating_add(offset));
                false
            }
            Some(&due) if now < due => false,
            Some(_) => {
                let next = now.saturating_add(self.jittered_interval(rng));
                self.next_due.insert(subject, next);
                true
            }
        }
    }

    fn jittered_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> Tick {
        let interval = i64::try_from(self.interval).unwrap_or(i64::MAX);
        let jitter = i64::try_from(self.jitter).unwrap_or(i64::MAX);
        let delta = if jitter > 0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0
        };
        interval.saturating_add(delta).max(1) as Tick
    }

    pub fn next_due(&self, subject: KingdomId) -> Option<Tick> {
        self.next_due.get(&subject).copied()
    }
}

/// Global and per-key firing cooldowns.
#[derive(Debug, Clone)]
pub struct Cooldowns {
    global: Tick,
    per_key: Tick,
    last_global: Option<Tick>,
    last_by_key: BTreeMap<KingdomId, Tick>,
}

impl Cooldowns {
    pub fn new(config: CadenceConfig) -> Self {
        Self {
            global: config.global_cooldown,
            per_key: config.per_causer_cooldown,
            last_global: None,
            last_by_key: BTreeMap::new(),
        }
    }

    /// True if neither the global nor `key`'s cooldown is running.
    pub fn ready(&self, key: KingdomId, now: Tick) -> bool {
        let global_ok = self
            .last_global
            .map_or(true, |last| now >= last.saturating_add(self.global));
        let key_ok = self
            .last_by_key
            .get(&key)
            .map_or(true, |&last| now >= last.saturating_add(self.per_key));
        global_ok && key_ok
    }

    pub fn record(&mut self, key: KingdomId, now: Tick) {
        self.last_global = Some(now);
        self.last_by_key.insert(key, now);
    }
}

/// Registers a template as a decaying modifier on `causee`.
///
/// Returns `None` when an identical event is already active.
pub fn register_decaying_modifier(
    store: &mut EventStore,
    template: &EventTemplate,
    causer: Option<KingdomId>,
    causee: KingdomId,
    now: Tick,
) -> Option<EventId> {
    store.try_add_event(
        causer,
        causee,
        template.type_id.clone(),
        template.effects.clone(),
        template.scope,
        now,
        template.duration,
    )
}

/// Applies a one-shot change to a kingdom's ledger. Returns false if the
/// kingdom has no ledger.
pub fn apply_instant_adjustment(
    realm: &mut dyn Realm,
    kingdom: KingdomId,
    adjustment: InstantAdjustment,
) -> bool {
    if adjustment.is_zero() {
        return false;
    }
    match realm.ledger_mut(kingdom) {
        Some(ledger) => {
            adjustment.apply_to(ledger);
            true
        }
        None => false,
    }
}

/// Herald line for a template, if it names a pool.
pub(crate) fn herald_bark(ctx: &mut PressureCtx<'_>, template: &EventTemplate) -> Option<String> {
    let pool = template.bark_pool(HERALD_GROUP)?;
    ctx.barks.pick(pool, &mut *ctx.rng).map(str::to_string)
}

pub(crate) fn notice(
    ctx: &mut PressureCtx<'_>,
    source: &str,
    template: &EventTemplate,
    causer: Option<KingdomId>,
    causee: KingdomId,
    event_id: EventId,
) -> PressureNotice {
    tracing::debug!(
        "{} fired {} on {} (causer {:?})",
        source,
        template.type_id,
        causee,
        causer
    );
    PressureNotice {
        source: source.to_string(),
        type_id: template.type_id.clone(),
        causer,
        causee,
        event_id,
        bark: herald_bark(ctx, template),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::barks::default_barks;
    use crate::catalog::default_catalog;
    use crate::realm::{Controller, Kingdom, Personality, SimpleRealm};
    use rand::SeedableRng;

    pub const PLAYER: KingdomId = KingdomId(1);
    pub const AI_A: KingdomId = KingdomId(2);
    pub const AI_B: KingdomId = KingdomId(3);

    /// Owns everything a [`PressureCtx`] borrows.
    pub struct Harness {
        pub store: EventStore,
        pub catalog: TemplateCatalog,
        pub barks: BarkPools,
        pub rng: SmallRng,
    }

    impl Harness {
        pub fn new(seed: u64) -> Self {
            Self {
                store: EventStore::new(),
                catalog: default_catalog(),
                barks: default_barks(),
                rng: SmallRng::seed_from_u64(seed),
            }
        }

        pub fn ctx(&mut self) -> PressureCtx<'_> {
            PressureCtx {
                store: &mut self.store,
                catalog: &self.catalog,
                barks: &self.barks,
                rng: &mut self.rng,
            }
        }
    }

    pub fn realm(personality: Personality) -> SimpleRealm {
        let mut realm = SimpleRealm::new();
        realm.register(Kingdom::new(PLAYER, "Player", Controller::Player).with_soldiers(100));
        realm.register(
            Kingdom::new(AI_A, "Brask", Controller::Ai)
                .with_personality(personality)
                .with_soldiers(80),
        );
        realm.register(
            Kingdom::new(AI_B, "Corvel", Controller::Ai)
                .with_personality(personality)
                .with_soldiers(80),
        );
        realm
    }

    /// Runs a scheduler over `ticks`, collecting every notice.
    pub fn run_for(
        scheduler: &mut dyn Scheduler,
        harness: &mut Harness,
        realm: &mut SimpleRealm,
        ticks: std::ops::Range<Tick>,
    ) -> Vec<PressureNotice> {
        let mut notices = Vec::new();
        for now in ticks {
            harness.store.tick(now);
            let mut ctx = harness.ctx();
            notices.extend(scheduler.run(&mut ctx, realm, now));
        }
        notices
    }
}
