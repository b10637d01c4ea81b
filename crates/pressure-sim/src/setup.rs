//! Demo Realm Setup
//!
//! Five kingdoms with distinct temperaments, one war and one alliance.

use pressure_engine::{Controller, Kingdom, Ledger, Personality, SimpleRealm};
use pressure_events::KingdomId;

pub const AVALON: KingdomId = KingdomId(1);
pub const BRASK: KingdomId = KingdomId(2);
pub const CORVEL: KingdomId = KingdomId(3);
pub const DUNMOOR: KingdomId = KingdomId(4);
pub const ESKER: KingdomId = KingdomId(5);

/// Create the demo realm
pub fn create_realm() -> SimpleRealm {
    let mut realm = SimpleRealm::new();

    // === PLAYER ===
    realm.register(
        Kingdom::new(AVALON, "Avalon", Controller::Player)
            .with_soldiers(120)
            .with_ledger(Ledger::new(500.0, 300.0)),
    );

    // === AI KINGDOMS ===
    // Warlike and stingy
    realm.register(
        Kingdom::new(BRASK, "Brask", Controller::Ai)
            .with_personality(Personality::new(0.85, 0.15, 0.5, 0.3))
            .with_soldiers(110)
            .with_ledger(Ledger::new(350.0, 200.0)),
    );

    // Generous merchants
    realm.register(
        Kingdom::new(CORVEL, "Corvel", Controller::Ai)
            .with_personality(Personality::new(0.2, 0.8, 0.7, 0.6))
            .with_soldiers(60)
            .with_ledger(Ledger::new(650.0, 250.0)),
    );

    // Pragmatic neighbours
    realm.register(
        Kingdom::new(DUNMOOR, "Dunmoor", Controller::Ai)
            .with_personality(Personality::new(0.5, 0.4, 0.3, 0.9))
            .with_soldiers(90)
            .with_ledger(Ledger::new(300.0, 350.0)),
    );

    realm.register(
        Kingdom::new(ESKER, "Esker", Controller::Ai)
            .with_personality(Personality::balanced())
            .with_soldiers(75)
            .with_ledger(Ledger::new(400.0, 300.0)),
    );

    realm.declare_war(AVALON, BRASK);
    realm.form_alliance(AVALON, CORVEL);
    realm.form_alliance(BRASK, DUNMOOR);

    realm.set_mutual_relation(AVALON, BRASK, -40.0);
    realm.set_mutual_relation(AVALON, CORVEL, 45.0);
    realm.set_mutual_relation(AVALON, DUNMOOR, 5.0);
    realm.set_mutual_relation(AVALON, ESKER, 15.0);
    realm.set_mutual_relation(BRASK, DUNMOOR, 35.0);
    realm.set_mutual_relation(CORVEL, ESKER, 20.0);

    realm
}

/// Name of a kingdom for printing, falling back to its id.
pub fn kingdom_name(realm: &SimpleRealm, id: KingdomId) -> String {
    realm
        .kingdom(id)
        .map(|k| k.name.clone())
        .unwrap_or_else(|| id.to_string())
}
