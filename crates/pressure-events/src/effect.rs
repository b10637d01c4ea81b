//! Effect Types
//!
//! The closed set of stats a pressure event can move, and the bundle of
//! deltas an event carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Effect values with a smaller magnitude than this are dropped on insert.
pub const MIN_EFFECT_MAGNITUDE: f64 = 1e-9;

/// Stats a pressure event can influence.
///
/// Serialized as a plain string so it can key both JSON and TOML tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Stat {
    /// Percentage multiplier: +0.12 means +12% output
    Economy,
    /// Additive happiness delta
    Happiness,
    /// Additive security delta
    Security,
    /// Additive relation delta (integer-like)
    Relations,
}

impl Stat {
    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Economy => "economy",
            Stat::Happiness => "happiness",
            Stat::Security => "security",
            Stat::Relations => "relations",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "economy" => Ok(Stat::Economy),
            "happiness" => Ok(Stat::Happiness),
            "security" => Ok(Stat::Security),
            "relations" => Ok(Stat::Relations),
            _ => Err(format!("unknown stat: {}", s)),
        }
    }
}

impl TryFrom<String> for Stat {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Stat> for &'static str {
    fn from(stat: Stat) -> Self {
        stat.as_str()
    }
}

/// Whether a relation modifier applies to every counterpart or only to the causer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationScope {
    /// Applies to every relation evaluation of the causee
    #[default]
    Global,
    /// Applies only when the counterpart is the event's causer
    CauserOnly,
}

/// A bundle of stat deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Effects(BTreeMap<Stat, f64>);

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets a stat delta, replacing any previous value.
    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.0.insert(stat, value);
        self
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.0.insert(stat, value);
    }

    /// Returns the delta for a stat, 0.0 if absent.
    pub fn get(&self, stat: Stat) -> f64 {
        self.0.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, stat: Stat) -> bool {
        self.0.contains_key(&stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.0.iter().map(|(s, v)| (*s, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops entries whose magnitude is below [`MIN_EFFECT_MAGNITUDE`].
    pub fn without_negligible(mut self) -> Self {
        self.0.retain(|_, v| v.abs() >= MIN_EFFECT_MAGNITUDE);
        self
    }
}

impl FromIterator<(Stat, f64)> for Effects {
    fn from_iter<I: IntoIterator<Item = (Stat, f64)>>(iter: I) -> Self {
        Effects(iter.into_iter().collect())
    }
}
