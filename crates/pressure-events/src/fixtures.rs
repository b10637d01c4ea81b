//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // pressure-events = { path = "../pressure-events", features = ["test-fixtures"] }
//!
//! use pressure_events::fixtures;
//!
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::PressureSnapshot;

/// Raw JSON of the sample snapshot.
pub const SAMPLE_SNAPSHOT_JSON: &str = include_str!("../tests/fixtures/sample_snapshot.json");

/// Raw JSON of a snapshot with a missing `known_ai` and a corrupt `entity_locks`.
pub const PARTIAL_SNAPSHOT_JSON: &str = include_str!("../tests/fixtures/partial_snapshot.json");

/// Returns the sample snapshot.
///
/// Contains:
/// - kingdom 1 (player): a `push_production` policy and a `border_raid` from kingdom 2
/// - kingdom 2: a `war_grievance` against kingdom 1
/// - kingdom 3: a world `drought` with no causer
/// - kingdom 2 marked as known
/// - one envoy lock on agent 501
pub fn sample_snapshot() -> PressureSnapshot {
    serde_json::from_str(SAMPLE_SNAPSHOT_JSON).expect("Failed to parse sample_snapshot.json")
}

/// Returns the partial snapshot, loaded leniently.
pub fn partial_snapshot() -> PressureSnapshot {
    PressureSnapshot::from_json_lenient(PARTIAL_SNAPSHOT_JSON)
        .expect("Failed to parse partial_snapshot.json")
}
