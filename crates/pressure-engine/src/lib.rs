//! Kingdom pressure engine.
//!
//! Time-boxed diplomatic, economic and military pressure on simulated
//! kingdoms: the event store, template catalog, modifier and relation
//! resolution, the probabilistic schedulers that generate new pressure,
//! and the gateways that validate player and NPC actions.

pub mod barks;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod persist;
pub mod realm;
pub mod relation;
pub mod resolver;
pub mod schedulers;
pub mod store;

use thiserror::Error;

pub use barks::{default_barks, BarkError, BarkPools};
pub use catalog::{
    default_catalog, default_catalog_toml, type_ids, CatalogError, EventTemplate, TemplateCatalog,
};
pub use config::{default_config_toml, ConfigError, EngineConfig};
pub use engine::{PressureEngine, TickReport};
pub use gateway::{
    ActionGateway, ActionKind, ActionRejected, ActionRequest, ActionSpec, AppliedAction, Channel,
    Requirement,
};
pub use persist::{read_snapshot, read_snapshot_or_default, write_snapshot, PersistError, SnapshotSaver};
pub use realm::{Controller, InstantAdjustment, Kingdom, Ledger, Personality, Realm, SimpleRealm};
pub use relation::{clamp_relation, RelationEvaluator};
pub use resolver::{ModifierResolver, Mods, PolicyLever, PolicyMults};
pub use schedulers::{
    GossipScheduler, PlayerPressureScheduler, PressureCtx, PressureNotice, Scheduler,
    WorldEventScheduler,
};
pub use store::{EventStore, SweepReport};

/// Any error the engine's loading and saving paths can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("barks: {0}")]
    Barks(#[from] BarkError),
    #[error("persistence: {0}")]
    Persist(#[from] PersistError),
}
