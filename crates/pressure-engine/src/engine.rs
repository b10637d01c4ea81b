//! The pressure engine context.
//!
//! Owns every piece of pressure state (store, catalog, bark pools,
//! scheduler cooldowns, the seeded RNG) so nothing lives in globals. The
//! host drives it with [`PressureEngine::tick`] once per time unit and
//! queries it on demand.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::Path;

use pressure_events::{EventId, KingdomId, PressureEvent, Tick};

use crate::barks::{default_barks, BarkPools};
use crate::catalog::{default_catalog, TemplateCatalog};
use crate::config::EngineConfig;
use crate::gateway::{ActionGateway, ActionRejected, ActionRequest, AppliedAction};
use crate::persist::{read_snapshot_or_default, PersistError, SnapshotSaver};
use crate::realm::Realm;
use crate::relation::RelationEvaluator;
use crate::resolver::{ModifierResolver, Mods, PolicyMults};
use crate::schedulers::{
    GossipScheduler, PlayerPressureScheduler, PressureCtx, PressureNotice, Scheduler,
    WorldEventScheduler,
};
use crate::store::{EventStore, SweepReport};

/// What happened during one engine tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: Tick,
    pub sweep: SweepReport,
    pub notices: Vec<PressureNotice>,
    pub saved: bool,
}

pub struct PressureEngine {
    config: EngineConfig,
    catalog: TemplateCatalog,
    barks: BarkPools,
    store: EventStore,
    schedulers: Vec<Box<dyn Scheduler>>,
    gateway: ActionGateway,
    resolver: ModifierResolver,
    evaluator: RelationEvaluator,
    saver: Option<SnapshotSaver>,
    rng: SmallRng,
}

impl PressureEngine {
    /// Creates an engine with the three built-in schedulers.
    pub fn new(config: EngineConfig, catalog: TemplateCatalog, barks: BarkPools, seed: u64) -> Self {
        let saver = config
            .persistence
            .path
            .as_ref()
            .map(|path| SnapshotSaver::new(path.clone(), config.persistence.debounce_ticks));

        let schedulers: Vec<Box<dyn Scheduler>> = vec![
            Box::new(PlayerPressureScheduler::new(config.player_pressure.clone())),
            Box::new(GossipScheduler::new(config.gossip.clone())),
            Box::new(WorldEventScheduler::new(config.world_events.clone())),
        ];

        Self {
            config,
            catalog,
            barks,
            store: EventStore::new(),
            schedulers,
            gateway: ActionGateway::new(),
            resolver: ModifierResolver::new(),
            evaluator: RelationEvaluator::new(),
            saver,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Engine with the built-in catalog and bark pools.
    pub fn with_defaults(config: EngineConfig, seed: u64) -> Self {
        Self::new(config, default_catalog(), default_barks(), seed)
    }

    /// Appends a scheduler; schedulers run in registration order.
    pub fn add_scheduler(&mut self, scheduler: Box<dyn Scheduler>) {
        self.schedulers.push(scheduler);
    }

    pub fn scheduler_names(&self) -> Vec<&'static str> {
        self.schedulers.iter().map(|s| s.name()).collect()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn barks(&self) -> &BarkPools {
        &self.barks
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EventStore {
        &mut self.store
    }

    fn ctx(&mut self) -> PressureCtx<'_> {
        PressureCtx {
            store: &mut self.store,
            catalog: &self.catalog,
            barks: &self.barks,
            rng: &mut self.rng,
        }
    }

    /// Advances the engine: expiry first, then every scheduler, then a
    /// debounced save.
    pub fn tick(&mut self, realm: &mut dyn Realm, now: Tick) -> TickReport {
        let sweep = self.store.tick(now);

        let mut notices = Vec::new();
        let mut ctx = PressureCtx {
            store: &mut self.store,
            catalog: &self.catalog,
            barks: &self.barks,
            rng: &mut self.rng,
        };
        for scheduler in &mut self.schedulers {
            notices.extend(scheduler.run(&mut ctx, realm, now));
        }

        let saved = match self.save_if_due(now) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Snapshot save failed at tick {}: {}", now, e);
                false
            }
        };

        TickReport {
            tick: now,
            sweep,
            notices,
            saved,
        }
    }

    /// Validates and applies a player or NPC action.
    pub fn apply_action(
        &mut self,
        realm: &mut dyn Realm,
        request: &ActionRequest,
        now: Tick,
    ) -> Result<AppliedAction, ActionRejected> {
        let gateway = self.gateway;
        gateway.apply(&mut self.ctx(), realm, request, now)
    }

    /// Enacts a domestic policy.
    pub fn enact_policy(
        &mut self,
        realm: &dyn Realm,
        kingdom: KingdomId,
        type_id: &str,
        now: Tick,
    ) -> Result<EventId, ActionRejected> {
        let gateway = self.gateway;
        gateway.enact_policy(&mut self.ctx(), realm, kingdom, type_id, now)
    }

    pub fn mods(&self, kingdom: KingdomId, now: Tick) -> Mods {
        self.resolver.mods(&self.store, kingdom, now)
    }

    pub fn policy_mults(&self, kingdom: KingdomId, now: Tick) -> PolicyMults {
        self.resolver.policy_mults(&self.store, kingdom, now)
    }

    /// `base` output scaled by the kingdom's economy multiplier.
    pub fn apply_economy(&self, kingdom: KingdomId, base: f64, now: Tick) -> f64 {
        self.resolver.apply_economy(&self.store, kingdom, base, now)
    }

    pub fn effective_relation(
        &self,
        realm: &dyn Realm,
        base: f64,
        from: Option<KingdomId>,
        to: Option<KingdomId>,
        now: Tick,
    ) -> f64 {
        self.evaluator
            .effective_relation(&self.store, realm, base, from, to, now)
    }

    /// Effective relation with the realm's stored base for the pair.
    pub fn relation_between(&self, realm: &dyn Realm, from: KingdomId, to: KingdomId, now: Tick) -> f64 {
        self.evaluator.relation_between(&self.store, realm, from, to, now)
    }

    pub fn events(&self, kingdom: KingdomId) -> &[PressureEvent] {
        self.store.events(kingdom)
    }

    /// Saves if persistence is configured, the store is dirty and the
    /// debounce window has passed.
    pub fn save_if_due(&mut self, now: Tick) -> Result<bool, PersistError> {
        match self.saver.as_mut() {
            Some(saver) => saver.save_if_due(&mut self.store, now),
            None => Ok(false),
        }
    }

    /// Saves immediately, ignoring the debounce window.
    pub fn flush(&mut self, now: Tick) -> Result<bool, PersistError> {
        match self.saver.as_mut() {
            Some(saver) => saver.save_now(&mut self.store, now).map(|_| true),
            None => Ok(false),
        }
    }

    /// First tick a resumed run should simulate: one past the last tick
    /// the store saw, or 0 for a fresh store.
    pub fn resume_tick(&self) -> Tick {
        self.store.last_tick().map_or(0, |t| t.saturating_add(1))
    }

    /// Replaces the store with the snapshot at `path`. A missing file
    /// leaves an empty store.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<usize, PersistError> {
        let snapshot = read_snapshot_or_default(path)?;
        let count = snapshot.event_count();
        self.store.restore(snapshot);
        tracing::info!("Loaded {} events from {}", count, path.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::type_ids;
    use crate::realm::{Controller, Kingdom, SimpleRealm};

    fn realm() -> SimpleRealm {
        let mut realm = SimpleRealm::new();
        realm.register(Kingdom::new(KingdomId(1), "Player", Controller::Player));
        realm.register(Kingdom::new(KingdomId(2), "Brask", Controller::Ai));
        realm
    }

    #[test]
    fn test_scheduler_order() {
        let engine = PressureEngine::with_defaults(EngineConfig::default(), 1);
        assert_eq!(
            engine.scheduler_names(),
            vec!["player_pressure", "gossip", "world_events"]
        );
    }

    #[test]
    fn test_expiry_runs_before_schedulers() {
        let mut engine = PressureEngine::with_defaults(EngineConfig::default(), 1);
        let mut realm = realm();
        engine
            .enact_policy(&realm, KingdomId(1), type_ids::FESTIVAL, 0)
            .unwrap();

        let report = engine.tick(&mut realm, 300);
        assert_eq!(report.sweep.events_removed, 1);
        assert!(!engine.store().has_active_event(KingdomId(1), type_ids::FESTIVAL, 300));
    }

    #[test]
    fn test_no_saver_without_path() {
        let mut engine = PressureEngine::with_defaults(EngineConfig::default(), 1);
        let mut realm = realm();
        engine
            .enact_policy(&realm, KingdomId(1), type_ids::FESTIVAL, 0)
            .unwrap();

        assert!(!engine.tick(&mut realm, 1).saved);
        assert!(!engine.flush(1).unwrap());
    }
}
