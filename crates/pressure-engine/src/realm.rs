//! Realm collaborator
//!
//! The engine never owns diplomacy or kingdom state. It reads and nudges it
//! through the [`Realm`] trait, which the host game implements.
//! [`SimpleRealm`] is an in-memory implementation used by the simulator
//! binary and the tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use pressure_events::KingdomId;

use crate::relation::clamp_relation;

/// Who decides for a kingdom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Player,
    Ai,
}

/// Ruler temperament that weights the schedulers' random gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggression: f64,
    pub generosity: f64,
    pub greed: f64,
    pub pragmatism: f64,
}

impl Personality {
    /// Creates a personality, clamping every trait to `[0, 1]`.
    pub fn new(aggression: f64, generosity: f64, greed: f64, pragmatism: f64) -> Self {
        Self {
            aggression: aggression.clamp(0.0, 1.0),
            generosity: generosity.clamp(0.0, 1.0),
            greed: greed.clamp(0.0, 1.0),
            pragmatism: pragmatism.clamp(0.0, 1.0),
        }
    }

    pub fn balanced() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5)
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Live numeric state of a kingdom that instant adjustments touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub gold: f64,
    pub food: f64,
    pub happiness: f64,
    pub security: f64,
}

impl Ledger {
    pub fn new(gold: f64, food: f64) -> Self {
        Self {
            gold,
            food,
            ..Self::default()
        }
    }
}

/// One-shot change to a ledger. Never recorded in the event store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InstantAdjustment {
    pub gold: f64,
    pub happiness: f64,
    pub security: f64,
}

impl InstantAdjustment {
    pub fn gold(amount: f64) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }

    pub fn happiness(amount: f64) -> Self {
        Self {
            happiness: amount,
            ..Self::default()
        }
    }

    pub fn with_security(mut self, amount: f64) -> Self {
        self.security = amount;
        self
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the adjustment; gold never drops below zero.
    pub fn apply_to(&self, ledger: &mut Ledger) {
        ledger.gold = (ledger.gold + self.gold).max(0.0);
        ledger.happiness += self.happiness;
        ledger.security += self.security;
    }
}

/// Diplomacy and kingdom state consumed by the engine.
///
/// Relations are directional: `relation(a, b)` is how `a` regards `b`.
pub trait Realm {
    /// Every kingdom, in a stable order.
    fn kingdom_ids(&self) -> Vec<KingdomId>;

    /// Controller of a kingdom, `None` if it does not exist.
    fn controller(&self, kingdom: KingdomId) -> Option<Controller>;

    fn player_kingdom(&self) -> Option<KingdomId>;

    fn is_at_war(&self, a: KingdomId, b: KingdomId) -> bool;

    fn is_allied(&self, a: KingdomId, b: KingdomId) -> bool;

    fn allies_of(&self, kingdom: KingdomId) -> Vec<KingdomId>;

    /// Stored base relation, without pressure modifiers.
    fn relation(&self, observer: KingdomId, subject: KingdomId) -> f64;

    /// Shifts the stored relation, clamped to `[-100, 100]`.
    fn add_relation(&mut self, observer: KingdomId, subject: KingdomId, delta: f64);

    fn personality(&self, kingdom: KingdomId) -> Personality;

    fn soldiers(&self, kingdom: KingdomId) -> u32;

    fn ledger_mut(&mut self, kingdom: KingdomId) -> Option<&mut Ledger>;

    fn contains(&self, kingdom: KingdomId) -> bool {
        self.controller(kingdom).is_some()
    }

    fn is_player(&self, kingdom: KingdomId) -> bool {
        self.controller(kingdom) == Some(Controller::Player)
    }

    fn is_ai(&self, kingdom: KingdomId) -> bool {
        self.controller(kingdom) == Some(Controller::Ai)
    }

    /// AI kingdoms in `kingdom_ids` order.
    fn ai_kingdoms(&self) -> Vec<KingdomId> {
        self.kingdom_ids()
            .into_iter()
            .filter(|k| self.is_ai(*k))
            .collect()
    }
}

/// A kingdom held by [`SimpleRealm`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kingdom {
    pub id: KingdomId,
    pub name: String,
    pub controller: Controller,
    pub personality: Personality,
    pub soldiers: u32,
    pub ledger: Ledger,
}

impl Kingdom {
    pub fn new(id: KingdomId, name: impl Into<String>, controller: Controller) -> Self {
        Self {
            id,
            name: name.into(),
            controller,
            personality: Personality::default(),
            soldiers: 0,
            ledger: Ledger::default(),
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_soldiers(mut self, soldiers: u32) -> Self {
        self.soldiers = soldiers;
        self
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }
}

fn pair(a: KingdomId, b: KingdomId) -> (KingdomId, KingdomId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// In-memory realm.
#[derive(Debug, Clone, Default)]
pub struct SimpleRealm {
    kingdoms: BTreeMap<KingdomId, Kingdom>,
    relations: BTreeMap<(KingdomId, KingdomId), f64>,
    wars: BTreeSet<(KingdomId, KingdomId)>,
    alliances: BTreeSet<(KingdomId, KingdomId)>,
}

impl SimpleRealm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kingdom: Kingdom) {
        self.kingdoms.insert(kingdom.id, kingdom);
    }

    pub fn kingdom(&self, id: KingdomId) -> Option<&Kingdom> {
        self.kingdoms.get(&id)
    }

    pub fn ledger(&self, id: KingdomId) -> Option<&Ledger> {
        self.kingdoms.get(&id).map(|k| &k.ledger)
    }

    pub fn set_relation(&mut self, observer: KingdomId, subject: KingdomId, value: f64) {
        self.relations.insert((observer, subject), clamp_relation(value));
    }

    /// Sets the relation in both directions.
    pub fn set_mutual_relation(&mut self, a: KingdomId, b: KingdomId, value: f64) {
        self.set_relation(a, b, value);
        self.set_relation(b, a, value);
    }

    /// Starts a war; any alliance between the two ends.
    pub fn declare_war(&mut self, a: KingdomId, b: KingdomId) {
        self.alliances.remove(&pair(a, b));
        self.wars.insert(pair(a, b));
    }

    pub fn make_peace(&mut self, a: KingdomId, b: KingdomId) {
        self.wars.remove(&pair(a, b));
    }

    /// Forms an alliance; any war between the two ends.
    pub fn form_alliance(&mut self, a: KingdomId, b: KingdomId) {
        self.wars.remove(&pair(a, b));
        self.alliances.insert(pair(a, b));
    }
}

impl Realm for SimpleRealm {
    fn kingdom_ids(&self) -> Vec<KingdomId> {
        self.kingdoms.keys().copied().collect()
    }

    fn controller(&self, kingdom: KingdomId) -> Option<Controller> {
        self.kingdoms.get(&kingdom).map(|k| k.controller)
    }

    fn player_kingdom(&self) -> Option<KingdomId> {
        self.kingdoms
            .values()
            .find(|k| k.controller == Controller::Player)
            .map(|k| k.id)
    }

    fn is_at_war(&self, a: KingdomId, b: KingdomId) -> bool {
        self.wars.contains(&pair(a, b))
    }

    fn is_allied(&self, a: KingdomId, b: KingdomId) -> bool {
        self.alliances.contains(&pair(a, b))
    }

    fn allies_of(&self, kingdom: KingdomId) -> Vec<KingdomId> {
        self.alliances
            .iter()
            .filter_map(|&(a, b)| match (a == kingdom, b == kingdom) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn relation(&self, observer: KingdomId, subject: KingdomId) -> f64 {
        self.relations
            .get(&(observer, subject))
            .copied()
            .unwrap_or(0.0)
    }

    fn add_relation(&mut self, observer: KingdomId, subject: KingdomId, delta: f64) {
        let current = self.relation(observer, subject);
        self.set_relation(observer, subject, current + delta);
    }

    fn personality(&self, kingdom: KingdomId) -> Personality {
        self.kingdoms
            .get(&kingdom)
            .map(|k| k.personality)
            .unwrap_or_default()
    }

    fn soldiers(&self, kingdom: KingdomId) -> u32 {
        self.kingdoms.get(&kingdom).map_or(0, |k| k.soldiers)
    }

    fn ledger_mut(&mut self, kingdom: KingdomId) -> Option<&mut Ledger> {
        self.kingdoms.get_mut(&kingdom).map(|k| &mut k.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K1: KingdomId = KingdomId(1);
    const K2: KingdomId = KingdomId(2);
    const K3: KingdomId = KingdomId(3);

    fn realm() -> SimpleRealm {
        let mut realm = SimpleRealm::new();
        realm.register(Kingdom::new(K1, "Avalon", Controller::Player).with_soldiers(100));
        realm.register(Kingdom::new(K2, "Brask", Controller::Ai).with_soldiers(60));
        realm.register(Kingdom::new(K3, "Corvel", Controller::Ai));
        realm
    }

    #[test]
    fn test_controllers() {
        let realm = realm();
        assert_eq!(realm.player_kingdom(), Some(K1));
        assert!(realm.is_player(K1));
        assert!(realm.is_ai(K2));
        assert!(!realm.contains(KingdomId(99)));
        assert_eq!(realm.ai_kingdoms(), vec![K2, K3]);
    }

    #[test]
    fn test_war_and_alliance_are_symmetric_and_exclusive() {
        let mut realm = realm();
        realm.form_alliance(K2, K1);
        assert!(realm.is_allied(K1, K2));
        assert_eq!(realm.allies_of(K1), vec![K2]);
        assert_eq!(realm.allies_of(K2), vec![K1]);

        realm.declare_war(K1, K2);
        assert!(realm.is_at_war(K2, K1));
        assert!(!realm.is_allied(K1, K2));

        realm.make_peace(K2, K1);
        assert!(!realm.is_at_war(K1, K2));
    }

    #[test]
    fn test_relations_are_directional_and_clamped() {
        let mut realm = realm();
        realm.set_relation(K1, K2, 90.0);
        realm.add_relation(K1, K2, 25.0);

        assert_eq!(realm.relation(K1, K2), 100.0);
        assert_eq!(realm.relation(K2, K1), 0.0);

        realm.add_relation(K2, K1, -300.0);
        assert_eq!(realm.relation(K2, K1), -100.0);
    }

    #[test]
    fn test_personality_is_clamped() {
        let p = Personality::new(1.5, -0.2, 0.3, 0.9);
        assert_eq!(p.aggression, 1.0);
        assert_eq!(p.generosity, 0.0);
        assert_eq!(p.greed, 0.3);
    }

    #[test]
    fn test_instant_adjustment_floors_gold() {
        let mut ledger = Ledger::new(30.0, 10.0);
        InstantAdjustment::gold(-40.0).apply_to(&mut ledger);
        assert_eq!(ledger.gold, 0.0);

        InstantAdjustment::happiness(0.5).with_security(-1.0).apply_to(&mut ledger);
        assert_eq!(ledger.happiness, 0.5);
        assert_eq!(ledger.security, -1.0);
        assert!(InstantAdjustment::default().is_zero());
    }
}
