//! Scripted player
//!
//! Stands in for a human: sends an envoy on a random diplomatic errand and
//! enacts a random policy at fixed intervals. Uses its own RNG so the
//! engine's pressure stream is unaffected by the script.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use pressure_engine::{type_ids, ActionKind, ActionRequest, Realm};
use pressure_events::{AgentId, KingdomId, Tick};

const POLICIES: &[&str] = &[
    type_ids::PUSH_PRODUCTION,
    type_ids::EASE_LABOR,
    type_ids::INCREASE_PATROLS,
    type_ids::DECREASE_PATROLS,
    type_ids::OPEN_MARKETS,
    type_ids::CLOSE_MARKETS,
    type_ids::FIELD_REST,
    type_ids::FESTIVAL,
];

/// Something the scripted player wants to do this tick.
#[derive(Debug, Clone)]
pub enum PlayerMove {
    Action(ActionRequest),
    Policy(&'static str),
}

pub struct PlayerScript {
    player: KingdomId,
    rng: SmallRng,
    action_interval: Tick,
    policy_interval: Tick,
}

impl PlayerScript {
    pub fn new(player: KingdomId, seed: u64, action_interval: Tick, policy_interval: Tick) -> Self {
        Self {
            player,
            rng: SmallRng::seed_from_u64(seed),
            action_interval: action_interval.max(1),
            policy_interval: policy_interval.max(1),
        }
    }

    /// Moves due at `now`, policies first.
    pub fn moves(&mut self, realm: &dyn Realm, now: Tick) -> Vec<PlayerMove> {
        let mut moves = Vec::new();
        if now == 0 {
            return moves;
        }

        if now % self.policy_interval == 0 {
            if let Some(policy) = POLICIES.choose(&mut self.rng) {
                moves.push(PlayerMove::Policy(*policy));
            }
        }

        if now % self.action_interval == 0 {
            let targets = realm.ai_kingdoms();
            let target = targets.choose(&mut self.rng).copied();
            let action = ActionKind::all().choose(&mut self.rng).copied();
            if let (Some(target), Some(action)) = (target, action) {
                // One envoy per destination
                let envoy = AgentId(100 + u64::from(target.0));
                moves.push(PlayerMove::Action(
                    ActionRequest::new(action, self.player, target).with_envoy(envoy),
                ));
            }
        }

        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{create_realm, AVALON};

    #[test]
    fn test_script_cadence() {
        let realm = create_realm();
        let mut script = PlayerScript::new(AVALON, 9, 100, 250);

        assert!(script.moves(&realm, 0).is_empty());
        assert!(script.moves(&realm, 99).is_empty());
        assert_eq!(script.moves(&realm, 100).len(), 1);
        assert_eq!(script.moves(&realm, 500).len(), 2);
    }

    #[test]
    fn test_script_targets_ai_only() {
        let realm = create_realm();
        let mut script = PlayerScript::new(AVALON, 3, 1, 1_000_000);

        for now in 1..200 {
            for m in script.moves(&realm, now) {
                if let PlayerMove::Action(request) = m {
                    assert_eq!(request.actor, AVALON);
                    assert!(realm.is_ai(request.target));
                }
            }
        }
    }
}
