//! Identifier Types
//!
//! Strongly typed ids for kingdoms, agents, events, and template types.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Discrete simulation time unit.
pub type Tick = u64;

/// Unique identifier for a kingdom (polity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KingdomId(pub u32);

impl fmt::Display for KingdomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kingdom_{}", self.0)
    }
}

impl From<u32> for KingdomId {
    fn from(id: u32) -> Self {
        KingdomId(id)
    }
}

/// Unique identifier for an individual agent (envoy, general, courier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

/// Unique identifier for a pressure event. Assigned sequentially by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt_{:08}", self.0)
    }
}

/// Template type id (e.g. "push_production", "border_raid").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        TypeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        TypeId(s.to_string())
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        TypeId(s)
    }
}

impl Borrow<str> for TypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
