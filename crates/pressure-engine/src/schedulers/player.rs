//! AI-to-player pressure.
//!
//! Every AI kingdom periodically leans on the player: hostile moves when
//! at war or aggressive, gifts and praise when friendly, trade pressure in
//! between.

use rand::Rng;

use pressure_events::{KingdomId, Tick};

use super::{
    apply_instant_adjustment, notice, register_decaying_modifier, Cadence, Cooldowns,
    PressureCtx, PressureNotice, Scheduler,
};
use crate::catalog::type_ids;
use crate::config::PlayerPressureConfig;
use crate::realm::{InstantAdjustment, Personality, Realm};

/// Broad kind of pressure an AI applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressureCategory {
    Hostile,
    Friendly,
    Trade,
}

/// Relative weights of the three categories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    pub hostile: f64,
    pub friendly: f64,
    pub trade: f64,
}

impl CategoryWeights {
    /// Picks a category proportionally to its weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> PressureCategory {
        let total = self.hostile + self.friendly + self.trade;
        if total <= 0.0 {
            return PressureCategory::Trade;
        }
        let roll = rng.gen::<f64>() * total;
        if roll < self.hostile {
            PressureCategory::Hostile
        } else if roll < self.hostile + self.friendly {
            PressureCategory::Friendly
        } else {
            PressureCategory::Trade
        }
    }
}

/// Schedules pressure from AI kingdoms onto the player.
#[derive(Debug, Clone)]
pub struct PlayerPressureScheduler {
    config: PlayerPressureConfig,
    cadence: Cadence,
    cooldowns: Cooldowns,
}

impl PlayerPressureScheduler {
    pub const NAME: &'static str = "player_pressure";

    pub fn new(config: PlayerPressureConfig) -> Self {
        let cadence = config.cadence();
        Self {
            config,
            cadence: Cadence::new(cadence),
            cooldowns: Cooldowns::new(cadence),
        }
    }

    /// Category weights for `ai` leaning on `player`.
    pub fn category_weights(&self, realm: &dyn Realm, ai: KingdomId, player: KingdomId) -> CategoryWeights {
        let mut weights = if realm.is_at_war(ai, player) {
            let hostile = self.config.hostile_at_war;
            CategoryWeights {
                hostile,
                friendly: (1.0 - hostile) * 0.4,
                trade: (1.0 - hostile) * 0.6,
            }
        } else if realm.is_allied(ai, player) {
            let friendly = self.config.friendly_when_allied;
            CategoryWeights {
                hostile: (1.0 - friendly) * 0.2,
                friendly,
                trade: (1.0 - friendly) * 0.8,
            }
        } else {
            let p = realm.personality(ai);
            let rel = (realm.relation(ai, player) / 100.0).clamp(-1.0, 1.0);
            CategoryWeights {
                hostile: 0.15 + 0.35 * p.aggression + 0.25 * (-rel).max(0.0),
                friendly: 0.15 + 0.35 * p.generosity + 0.25 * rel.max(0.0),
                trade: 0.15 + 0.35 * p.greed,
            }
        };

        let solidarity = realm
            .allies_of(ai)
            .into_iter()
            .any(|ally| ally != player && realm.is_at_war(ally, player));
        if solidarity {
            weights.hostile += self.config.ally_solidarity_bonus;
        }
        weights
    }

    fn pick_template<R: Rng + ?Sized>(
        &self,
        category: PressureCategory,
        personality: Personality,
        strong_enough: bool,
        rng: &mut R,
    ) -> &'static str {
        match category {
            PressureCategory::Hostile => {
                if rng.gen::<f64>() < personality.aggression && strong_enough {
                    type_ids::BORDER_RAID
                } else if rng.gen::<f64>() < personality.aggression {
                    type_ids::THREAT_ISSUED
                } else {
                    type_ids::INSULT_RECEIVED
                }
            }
            PressureCategory::Friendly => {
                if rng.gen::<f64>() < personality.generosity {
                    type_ids::GIFT_RECEIVED
                } else {
                    type_ids::ENVOY_PRAISE
                }
            }
            PressureCategory::Trade => {
                if rng.gen::<f64>() < personality.greed * 0.6 {
                    type_ids::EMBARGO
                } else {
                    type_ids::TRADE_PACT
                }
            }
        }
    }

    fn fuzz_for(&self, type_id: &str) -> InstantAdjustment {
        match type_id {
            type_ids::BORDER_RAID => InstantAdjustment::gold(-self.config.raid_gold_loss),
            type_ids::GIFT_RECEIVED => InstantAdjustment::gold(self.config.gift_gold),
            _ => InstantAdjustment::default(),
        }
    }

    fn fire(
        &mut self,
        ctx: &mut PressureCtx<'_>,
        realm: &mut dyn Realm,
        ai: KingdomId,
        player: KingdomId,
        now: Tick,
    ) -> Vec<PressureNotice> {
        let catalog = ctx.catalog;
        let at_war = realm.is_at_war(ai, player);
        let category = self.category_weights(realm, ai, player).pick(&mut *ctx.rng);
        let strong_enough =
            realm.soldiers(ai) as f64 >= self.config.raid_strength_ratio * realm.soldiers(player) as f64;
        let type_id = self.pick_template(category, realm.personality(ai), strong_enough, &mut *ctx.rng);

        if ctx.store.has_active_by_causer(player, type_id, ai, now) {
            return Vec::new();
        }
        let Some(template) = catalog.by_type_id(type_id) else {
            return Vec::new();
        };
        let Some(event_id) = register_decaying_modifier(ctx.store, template, Some(ai), player, now) else {
            return Vec::new();
        };

        apply_instant_adjustment(realm, player, self.fuzz_for(type_id));
        self.cooldowns.record(ai, now);

        let mut notices = vec![notice(ctx, Self::NAME, template, Some(ai), player, event_id)];

        if at_war && category == PressureCategory::Hostile {
            if let Some(grievance) = catalog.by_type_id(type_ids::WAR_GRIEVANCE) {
                if let Some(mirror_id) =
                    register_decaying_modifier(ctx.store, grievance, Some(player), ai, now)
                {
                    notices.push(notice(ctx, Self::NAME, grievance, Some(player), ai, mirror_id));
                }
            }
        }
        notices
    }
}

impl Scheduler for PlayerPressureScheduler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self, ctx: &mut PressureCtx<'_>, realm: &mut dyn Realm, now: Tick) -> Vec<PressureNotice> {
        let Some(player) = realm.player_kingdom() else {
            return Vec::new();
        };

        let mut notices = Vec::new();
        for ai in realm.ai_kingdoms() {
            if !self.cadence.check(ai, now, &mut *ctx.rng) {
                continue;
            }
            if !self.cooldowns.ready(ai, now) {
                continue;
            }
            notices.extend(self.fire(ctx, realm, ai, player, now));
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedulers::test_support::*;
    use crate::realm::{Ledger, SimpleRealm};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn fast_config() -> PlayerPressureConfig {
        PlayerPressureConfig {
            interval: 10,
            jitter: 0,
            global_cooldown: 0,
            per_causer_cooldown: 0,
            ..PlayerPressureConfig::default()
        }
    }

    fn with_ledgers(mut realm: SimpleRealm) -> SimpleRealm {
        for k in [PLAYER, AI_A, AI_B] {
            if let Some(ledger) = realm.ledger_mut(k) {
                *ledger = Ledger::new(1000.0, 0.0);
            }
        }
        realm
    }

    #[test]
    fn test_category_weights_at_war_and_allied() {
        let scheduler = PlayerPressureScheduler::new(PlayerPressureConfig::default());
        let mut realm = realm(Personality::balanced());

        realm.declare_war(AI_A, PLAYER);
        let w = scheduler.category_weights(&realm, AI_A, PLAYER);
        assert_eq!(w.hostile, 0.75);

        realm.form_alliance(AI_A, PLAYER);
        let w = scheduler.category_weights(&realm, AI_A, PLAYER);
        assert_eq!(w.friendly, 0.70);
    }

    #[test]
    fn test_ally_solidarity_bonus() {
        let scheduler = PlayerPressureScheduler::new(PlayerPressureConfig::default());
        let mut realm = realm(Personality::balanced());
        let before = scheduler.category_weights(&realm, AI_A, PLAYER).hostile;

        realm.form_alliance(AI_A, AI_B);
        realm.declare_war(AI_B, PLAYER);
        let after = scheduler.category_weights(&realm, AI_A, PLAYER).hostile;

        assert!((after - before - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_weights_pick_only_positive_category() {
        let mut rng = SmallRng::seed_from_u64(5);
        let weights = CategoryWeights {
            hostile: 0.0,
            friendly: 1.0,
            trade: 0.0,
        };
        for _ in 0..100 {
            assert_eq!(weights.pick(&mut rng), PressureCategory::Friendly);
        }
    }

    #[test]
    fn test_war_pressure_is_mirrored_with_grievance() {
        let aggressive = Personality::new(1.0, 0.0, 0.0, 0.0);
        let mut realm = with_ledgers(realm(aggressive));
        realm.declare_war(AI_A, PLAYER);
        let config = PlayerPressureConfig {
            hostile_at_war: 1.0,
            ..fast_config()
        };
        let mut scheduler = PlayerPressureScheduler::new(config);
        let mut harness = Harness::new(11);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..30);

        let raid = notices
            .iter()
            .find(|n| n.causer == Some(AI_A) && n.causee == PLAYER)
            .expect("AI at war should pressure the player");
        // Aggression 1.0 and enough soldiers: always a raid
        assert_eq!(raid.type_id.as_str(), type_ids::BORDER_RAID);
        assert!(raid.bark.is_some());

        assert!(harness.store.has_active_by_causer(AI_A, type_ids::WAR_GRIEVANCE, PLAYER, 30));
        let player_event = harness
            .store
            .events(PLAYER)
            .iter()
            .find(|e| e.type_id.as_str() == type_ids::BORDER_RAID)
            .unwrap();
        assert_eq!(player_event.causer, Some(AI_A));

        // Raid fuzz reached the player's ledger
        assert!(realm.ledger(PLAYER).unwrap().gold < 1000.0);
    }

    #[test]
    fn test_weak_aggressor_threatens_instead_of_raiding() {
        let aggressive = Personality::new(1.0, 0.0, 0.0, 0.0);
        let mut realm = realm(aggressive);
        realm.declare_war(AI_A, PLAYER);
        let config = PlayerPressureConfig {
            hostile_at_war: 1.0,
            raid_strength_ratio: 10.0,
            ..fast_config()
        };
        let mut scheduler = PlayerPressureScheduler::new(config);
        let mut harness = Harness::new(11);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..30);
        let from_a: Vec<_> = notices
            .iter()
            .filter(|n| n.causer == Some(AI_A) && n.causee == PLAYER)
            .collect();
        assert!(!from_a.is_empty());
        assert!(from_a.iter().all(|n| n.type_id.as_str() == type_ids::THREAT_ISSUED));
    }

    #[test]
    fn test_active_pressure_is_not_stacked() {
        let generous = Personality::new(0.0, 1.0, 0.0, 0.0);
        let mut realm = realm(generous);
        realm.form_alliance(AI_A, PLAYER);
        let config = PlayerPressureConfig {
            friendly_when_allied: 1.0,
            ..fast_config()
        };
        let mut scheduler = PlayerPressureScheduler::new(config);
        let mut harness = Harness::new(3);

        // gift_received lasts 900 ticks, so A can gift at most once here
        run_for(&mut scheduler, &mut harness, &mut realm, 0..200);
        let gifts_from_a = harness
            .store
            .events(PLAYER)
            .iter()
            .filter(|e| e.type_id.as_str() == type_ids::GIFT_RECEIVED && e.causer == Some(AI_A))
            .count();
        assert_eq!(gifts_from_a, 1);
    }

    #[test]
    fn test_global_cooldown_suppresses_second_subject() {
        let aggressive = Personality::new(1.0, 0.0, 0.0, 0.0);
        let mut realm = realm(aggressive);
        realm.declare_war(AI_A, PLAYER);
        realm.declare_war(AI_B, PLAYER);
        let config = PlayerPressureConfig {
            interval: 1,
            jitter: 0,
            global_cooldown: 10_000,
            per_causer_cooldown: 0,
            hostile_at_war: 1.0,
            ..PlayerPressureConfig::default()
        };
        let mut scheduler = PlayerPressureScheduler::new(config);
        let mut harness = Harness::new(1);

        let notices = run_for(&mut scheduler, &mut harness, &mut realm, 0..100);
        let causers: std::collections::BTreeSet<_> = notices
            .iter()
            .filter(|n| n.causee == PLAYER)
            .filter_map(|n| n.causer)
            .collect();
        assert_eq!(causers.len(), 1);
    }

    #[test]
    fn test_no_player_no_pressure() {
        let mut realm = SimpleRealm::new();
        realm.register(crate::realm::Kingdom::new(AI_A, "A", crate::realm::Controller::Ai));
        let mut scheduler = PlayerPressureScheduler::new(fast_config());
        let mut harness = Harness::new(1);

        assert!(run_for(&mut scheduler, &mut harness, &mut realm, 0..50).is_empty());
    }
}
