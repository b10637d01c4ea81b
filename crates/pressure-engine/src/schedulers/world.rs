//! World Events
//!
//! Harvests, droughts, plague and the like. They have no causer and land
//! as global events on a single kingdom.

use rand::seq::SliceRandom;
use rand::Rng;

use pressure_events::{KingdomId, RelationScope, Tick};

use super::{notice, Cadence, Cooldowns, PressureCtx, PressureNotice, Scheduler};
use crate::catalog::type_ids;
use crate::config::WorldEventConfig;
use crate::realm::Realm;

/// Candidate world templates and their relative weights.
pub const WORLD_EVENT_WEIGHTS: &[(&str, u32)] = &[
    (type_ids::BOUNTIFUL_HARVEST, 3),
    (type_ids::TRADE_BOOM, 2),
    (type_ids::DROUGHT, 2),
    (type_ids::BANDIT_SEASON, 2),
    (type_ids::PLAGUE, 1),
];

#[derive(Debug, Clone)]
pub struct WorldEventScheduler {
    config: WorldEventConfig,
    cadence: Cadence,
    cooldowns: Cooldowns,
}

impl WorldEventScheduler {
    pub const NAME: &'static str = "world_events";

    pub fn new(config: WorldEventConfig) -> Self {
        let cadence = config.cadence();
        Self {
            config,
            cadence: Cadence::new(cadence),
            cooldowns: Cooldowns::new(cadence),
        }
    }

    fn fire(&mut self, ctx: &mut PressureCtx<'_>, kingdom: KingdomId, now: Tick) -> Option<PressureNotice> {
        if ctx.rng.gen::<f64>() >= self.config.fire_chance {
            return None;
        }
        let catalog = ctx.catalog;
        let &(type_id, _) = WORLD_EVENT_WEIGHTS
            .choose_weighted(&mut *ctx.rng, |(_, weight)| *weight)
            .ok()?;
        let template = catalog.by_type_id(type_id)?;

        let event_id = ctx.store.try_add_event(
            None,
            kingdom,
            template.type_id.clone(),
            template.effects.clone(),
            RelationScope::Global,
            now,
            template.duration,
        )?;

        self.cooldowns.record(kingdom, now);
        Some(notice(ctx, Self::NAME, template, None, kingdom, event_id))
    }
}

impl Scheduler for WorldEventScheduler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self, ctx: &mut PressureCtx<'_>, realm: &mut dyn Realm, now: Tick) -> Vec<PressureNotice> {
        let mut notices = Vec::new();
        for kingdom in realm.kingdom_ids() {
            if !self.cadence.check(kingdom, now, &mut *ctx.rng) {
                continue;
            }
            if !self.cooldowns.ready(kingdom, now) {
                continue;
            }
            notices.extend(self.fire(ctx, kingdom, now));
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::realm::Personality;
    use crate::schedulers::test_support::*;

    fn always() -> WorldEventConfig {
        WorldEventConfig {
            interval: 20,
            jitter: 0,
            global_cooldown: 0,
            per_causer_cooldown: 0,
            fire_chance: 1.0,
        }
    }

    #[test]
    fn test_every_weighted_template_exists() {
        let catalog = default_catalog();
        for (type_id, weight) in WORLD_EVENT_WEIGHTS {
            assert!(catalog.contains(type_id), "missing {}", type_id);
            assert!(*weight > 0);
        }
    }

    #[test]
    fn test_world_events_are_global_and_causerless() {
        let mut realm = realm(Personality::balanced());
        let mut scheduler = WorldEventScheduler::new(always());
        let mut harness = Harness::new(21);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..100);

        assert!(!notices.is_empty());
        for n in &notices {
            assert!(n.causer.is_none());
            assert!(WORLD_EVENT_WEIGHTS.iter().any(|(id, _)| *id == n.type_id.as_str()));
        }
        for k in [PLAYER, AI_A, AI_B] {
            for e in harness.store.events(k) {
                assert_eq!(e.scope, RelationScope::Global);
                assert!(e.causer.is_none());
            }
        }
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let mut realm = realm(Personality::balanced());
        let mut scheduler = WorldEventScheduler::new(WorldEventConfig {
            fire_chance: 0.0,
            ..always()
        });
        let mut harness = Harness::new(21);

        assert!(run_for(&mut scheduler, &mut harness, &mut realm, 0..500).is_empty());
    }

    #[test]
    fn test_same_seed_same_notices() {
        let run = |seed| {
            let mut realm = realm(Personality::balanced());
            let mut scheduler = WorldEventScheduler::new(always());
            let mut harness = Harness::new(seed);
            run_for(&mut scheduler, &mut harness, &mut realm, 0..400)
        };
        assert_eq!(run(77), run(77));
    }
}
