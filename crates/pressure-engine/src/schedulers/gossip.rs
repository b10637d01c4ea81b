//! AI-to-AI gossip.
//!
//! AI courts trade rapport, slander and old rivalries among themselves.
//! Every firing registers a mirrored causer-only pair, one event on each
//! side with the other as causer.

use rand::seq::SliceRandom;
use rand::Rng;

use pressure_events::{KingdomId, Tick};

use super::{
    apply_instant_adjustment, notice, register_decaying_modifier, Cadence, Cooldowns,
    PressureCtx, PressureNotice, Scheduler,
};
use crate::catalog::type_ids;
use crate::config::GossipConfig;
use crate::realm::{InstantAdjustment, Realm};

#[derive(Debug, Clone)]
pub struct GossipScheduler {
    config: GossipConfig,
    cadence: Cadence,
    cooldowns: Cooldowns,
}

impl GossipScheduler {
    pub const NAME: &'static str = "gossip";

    pub fn new(config: GossipConfig) -> Self {
        let cadence = config.cadence();
        Self {
            config,
            cadence: Cadence::new(cadence),
            cooldowns: Cooldowns::new(cadence),
        }
    }

    /// Template `speaker` directs at `other`, or `None` if it stays quiet.
    fn pick_template<R: Rng + ?Sized>(
        &self,
        realm: &dyn Realm,
        speaker: KingdomId,
        other: KingdomId,
        rng: &mut R,
    ) -> Option<&'static str> {
        if realm.is_at_war(speaker, other) {
            return Some(type_ids::RIVALRY);
        }
        if realm.is_allied(speaker, other) {
            return Some(type_ids::RAPPORT);
        }
        let p = realm.personality(speaker);
        if rng.gen::<f64>() < p.pragmatism {
            Some(type_ids::RAPPORT)
        } else if rng.gen::<f64>() < p.aggression {
            Some(type_ids::SLANDER)
        } else {
            None
        }
    }

    fn fire(
        &mut self,
        ctx: &mut PressureCtx<'_>,
        realm: &mut dyn Realm,
        speaker: KingdomId,
        others: &[KingdomId],
        now: Tick,
    ) -> Vec<PressureNotice> {
        let catalog = ctx.catalog;
        let Some(&other) = others.choose(&mut *ctx.rng) else {
            return Vec::new();
        };
        let Some(type_id) = self.pick_template(realm, speaker, other, &mut *ctx.rng) else {
            return Vec::new();
        };
        let Some(template) = catalog.by_type_id(type_id) else {
            return Vec::new();
        };

        if ctx.store.has_active_by_causer(other, type_id, speaker, now)
            || ctx.store.has_active_by_causer(speaker, type_id, other, now)
        {
            return Vec::new();
        }

        let mut notices = Vec::with_capacity(2);
        for (causer, causee) in [(speaker, other), (other, speaker)] {
            if let Some(event_id) = register_decaying_modifier(ctx.store, template, Some(causer), causee, now) {
                notices.push(notice(ctx, Self::NAME, template, Some(causer), causee, event_id));
            }
        }

        if type_id == type_ids::RAPPORT {
            let cheer = InstantAdjustment::happiness(self.config.rapport_happiness_fuzz);
            apply_instant_adjustment(realm, speaker, cheer);
            apply_instant_adjustment(realm, other, cheer);
        }

        self.cooldowns.record(speaker, now);
        notices
    }
}

impl Scheduler for GossipScheduler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self, ctx: &mut PressureCtx<'_>, realm: &mut dyn Realm, now: Tick) -> Vec<PressureNotice> {
        let ais = realm.ai_kingdoms();
        let mut notices = Vec::new();

        for &speaker in &ais {
            if !self.cadence.check(speaker, now, &mut *ctx.rng) {
                continue;
            }
            if !self.cooldowns.ready(speaker, now) {
                continue;
            }
            let others: Vec<KingdomId> = ais.iter().copied().filter(|k| *k != speaker).collect();
            notices.extend(self.fire(ctx, realm, speaker, &others, now));
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::Personality;
    use crate::schedulers::test_support::*;

    fn fast_config() -> GossipConfig {
        GossipConfig {
            interval: 10,
            jitter: 0,
            global_cooldown: 0,
            per_causer_cooldown: 0,
            ..GossipConfig::default()
        }
    }

    #[test]
    fn test_war_breeds_mirrored_rivalry() {
        let mut realm = realm(Personality::balanced());
        realm.declare_war(AI_A, AI_B);
        let mut scheduler = GossipScheduler::new(fast_config());
        let mut harness = Harness::new(4);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..30);

        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.type_id.as_str() == type_ids::RIVALRY));
        assert!(harness.store.has_active_by_causer(AI_A, type_ids::RIVALRY, AI_B, 30));
        assert!(harness.store.has_active_by_causer(AI_B, type_ids::RIVALRY, AI_A, 30));
    }

    #[test]
    fn test_player_is_never_involved() {
        let mut realm = realm(Personality::new(1.0, 0.0, 0.0, 1.0));
        let mut scheduler = GossipScheduler::new(fast_config());
        let mut harness = Harness::new(8);

        run_for(&mut scheduler, &mut harness, &mut realm, 0..200);
        assert!(harness.store.events(PLAYER).is_empty());
    }

    #[test]
    fn test_pragmatic_courts_build_rapport_and_cheer() {
        let mut realm = realm(Personality::new(0.0, 0.0, 0.0, 1.0));
        let mut scheduler = GossipScheduler::new(fast_config());
        let mut harness = Harness::new(2);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..30);

        assert!(!notices.is_empty());
        assert!(notices.iter().all(|n| n.type_id.as_str() == type_ids::RAPPORT));
        let happiness = realm.ledger(AI_A).map(|l| l.happiness).unwrap_or_default();
        assert!(happiness > 0.0);
    }

    #[test]
    fn test_meek_courts_stay_quiet() {
        let mut realm = realm(Personality::new(0.0, 0.0, 0.0, 0.0));
        let mut scheduler = GossipScheduler::new(fast_config());
        let mut harness = Harness::new(2);

        assert!(run_for(&mut scheduler, &mut harness, &mut realm, 0..100).is_empty());
    }
}
