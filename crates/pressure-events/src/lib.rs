//! Shared pressure-event types and serialization for the kingdom simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod effect;
pub mod event;
pub mod ids;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export id types
pub use ids::{AgentId, EventId, KingdomId, Tick, TypeId};

// Re-export effect types
pub use effect::{Effects, RelationScope, Stat, MIN_EFFECT_MAGNITUDE};

// Re-export event types
pub use event::{EntityLock, PressureEvent};

// Re-export snapshot types
pub use snapshot::PressureSnapshot;
