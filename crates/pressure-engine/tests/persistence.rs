//! Snapshot loading and debounced saving

use pressure_engine::{
    type_ids, Controller, EngineConfig, EventStore, Kingdom, PressureEngine, SimpleRealm,
};
use pressure_events::{fixtures, AgentId, Effects, KingdomId, RelationScope, Stat};
use tempfile::TempDir;

const K1: KingdomId = KingdomId(1);
const K2: KingdomId = KingdomId(2);

fn realm() -> SimpleRealm {
    let mut realm = SimpleRealm::new();
    realm.register(Kingdom::new(K1, "Avalon", Controller::Player));
    realm.register(Kingdom::new(K2, "Brask", Controller::Ai));
    realm
}

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.player_pressure.interval = 1_000_000_000;
    config.gossip.interval = 1_000_000_000;
    config.world_events.fire_chance = 0.0;
    config
}

#[test]
fn test_sample_snapshot_restores_store() {
    let store = EventStore::from_snapshot(fixtures::sample_snapshot());

    assert_eq!(store.event_count(), 4);
    assert!(store.is_known_ai(K2));
    assert!(!store.is_dirty());

    // push_production and the border raid stack multiplicatively
    let mods = store.get_mods(K1, 1150);
    assert!((mods.economy_mult - 1.12 * 0.96).abs() < 1e-9);
    assert!((mods.security_delta + 1.5).abs() < 1e-9);

    assert!(store.is_entity_locked(AgentId(501), 1399));
    assert!(!store.is_entity_locked(AgentId(501), 1400));
}

#[test]
fn test_ids_continue_after_restored_lock() {
    let mut store = EventStore::from_snapshot(fixtures::sample_snapshot());
    let id = store.add_event(
        None,
        K1,
        "festival",
        Effects::new().with(Stat::Happiness, 1.0),
        RelationScope::Global,
        1200,
        300,
    );
    assert_eq!(id.0, 22);
    assert!(store.is_dirty());
}

#[test]
fn test_partial_snapshot_defaults_missing_fields() {
    let store = EventStore::from_snapshot(fixtures::partial_snapshot());

    assert_eq!(store.event_count(), 1);
    assert!(!store.is_known_ai(KingdomId(4)));
    assert!(store.entity_lock(AgentId(17)).is_none());
    assert!(store.has_active_event(KingdomId(4), type_ids::FESTIVAL, 100));
    assert!(!store.has_active_event(KingdomId(4), type_ids::FESTIVAL, 310));
}

#[test]
fn test_engine_saves_with_debounce_and_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saves").join("pressure.json");

    let mut config = quiet_config();
    config.persistence.path = Some(path.clone());
    config.persistence.debounce_ticks = 100;

    let mut engine = PressureEngine::with_defaults(config, 5);
    let mut realm = realm();

    engine.enact_policy(&realm, K1, type_ids::FESTIVAL, 0).unwrap();
    assert!(engine.tick(&mut realm, 1).saved);
    assert!(path.exists());

    // A clean store is never written
    assert!(!engine.tick(&mut realm, 2).saved);

    engine.store_mut().mark_known_ai(K2);
    assert!(!engine.tick(&mut realm, 50).saved);
    assert!(engine.store().is_dirty());
    assert!(engine.tick(&mut realm, 101).saved);

    let mut reloaded = PressureEngine::with_defaults(quiet_config(), 5);
    let count = reloaded.load_snapshot(&path).unwrap();
    assert_eq!(count, 1);
    assert_eq!(reloaded.store().snapshot(), engine.store().snapshot());
    assert!(reloaded.store().is_known_ai(K2));
}

#[test]
fn test_resumed_run_continues_the_clock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pressure.json");

    let mut config = quiet_config();
    config.persistence.path = Some(path.clone());

    let mut engine = PressureEngine::with_defaults(config, 5);
    let mut realm = realm();
    assert_eq!(engine.resume_tick(), 0);

    engine.enact_policy(&realm, K1, type_ids::FESTIVAL, 200).unwrap();
    for now in 200..=250 {
        engine.tick(&mut realm, now);
    }
    engine.flush(250).unwrap();

    let mut reloaded = PressureEngine::with_defaults(quiet_config(), 5);
    reloaded.load_snapshot(&path).unwrap();
    let start = reloaded.resume_tick();
    assert_eq!(start, 251);

    // The festival keeps its original window: 200 + 300
    assert!(reloaded.store().has_active_event(K1, type_ids::FESTIVAL, start));
    let report = reloaded.tick(&mut realm, 500);
    assert_eq!(report.sweep.events_removed, 1);
}

#[test]
fn test_flush_ignores_debounce() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pressure.json");

    let mut config = quiet_config();
    config.persistence.path = Some(path.clone());
    config.persistence.debounce_ticks = 1000;

    let mut engine = PressureEngine::with_defaults(config, 5);
    let mut realm = realm();

    engine.enact_policy(&realm, K1, type_ids::PUSH_PRODUCTION, 0).unwrap();
    assert!(engine.tick(&mut realm, 0).saved);

    engine.store_mut().mark_known_ai(K2);
    assert!(!engine.tick(&mut realm, 10).saved);
    assert!(engine.flush(10).unwrap());
    assert!(!engine.store().is_dirty());
}

#[test]
fn test_missing_snapshot_loads_empty() {
    let dir = TempDir::new().unwrap();
    let mut engine = PressureEngine::with_defaults(quiet_config(), 5);
    let realm = realm();
    engine.enact_policy(&realm, K1, type_ids::FESTIVAL, 0).unwrap();

    let count = engine.load_snapshot(&dir.path().join("absent.json")).unwrap();
    assert_eq!(count, 0);
    assert_eq!(engine.store().event_count(), 0);
}
