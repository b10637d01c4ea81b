//! Modifier resolution.
//!
//! Folds a kingdom's active pressure events into the aggregate [`Mods`]
//! snapshot read by the economy/happiness/security calculators, and into
//! the secondary policy multipliers read by the upkeep and production code.

use serde::{Deserialize, Serialize};

use pressure_events::{KingdomId, Stat, Tick};

use crate::catalog::type_ids;
use crate::store::EventStore;

/// Lower bound of the combined economy multiplier.
pub const ECONOMY_MULT_FLOOR: f64 = 0.10;

/// Aggregated influence of all active events on one kingdom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mods {
    /// Product of `(1 + pct)` over all economy entries, floored at 0.10
    pub economy_mult: f64,
    pub happiness_delta: f64,
    pub security_delta: f64,
    /// Sum of every relations entry regardless of scope
    pub relations_delta: f64,
}

impl Mods {
    pub const NEUTRAL: Mods = Mods {
        economy_mult: 1.0,
        happiness_delta: 0.0,
        security_delta: 0.0,
        relations_delta: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl Default for Mods {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Secondary multipliers driven by domestic policy events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyMults {
    /// Upkeep cost of garrisons and patrols
    pub guard_cost: f64,
    /// Resources flowing in from trade and production
    pub resource_in: f64,
    /// Resources flowing out through upkeep and exports
    pub resource_out: f64,
    /// Regeneration rate of land and population
    pub regen: f64,
}

impl PolicyMults {
    pub const NEUTRAL: PolicyMults = PolicyMults {
        guard_cost: 1.0,
        resource_in: 1.0,
        resource_out: 1.0,
        regen: 1.0,
    };

    fn combine(self, other: PolicyMults) -> PolicyMults {
        PolicyMults {
            guard_cost: self.guard_cost * other.guard_cost,
            resource_in: self.resource_in * other.resource_in,
            resource_out: self.resource_out * other.resource_out,
            regen: self.regen * other.regen,
        }
    }
}

impl Default for PolicyMults {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Domestic policies that move the secondary multipliers.
///
/// Opposite pairs (increase/decrease patrols, open/close markets) are kept
/// apart by template exclusivity groups, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyLever {
    IncreasePatrols,
    DecreasePatrols,
    OpenMarkets,
    CloseMarkets,
    FieldRest,
    PushProduction,
    Festival,
}

impl PolicyLever {
    const TABLE: &'static [(&'static str, PolicyLever)] = &[
        (type_ids::INCREASE_PATROLS, PolicyLever::IncreasePatrols),
        (type_ids::DECREASE_PATROLS, PolicyLever::DecreasePatrols),
        (type_ids::OPEN_MARKETS, PolicyLever::OpenMarkets),
        (type_ids::CLOSE_MARKETS, PolicyLever::CloseMarkets),
        (type_ids::FIELD_REST, PolicyLever::FieldRest),
        (type_ids::PUSH_PRODUCTION, PolicyLever::PushProduction),
        (type_ids::FESTIVAL, PolicyLever::Festival),
    ];

    /// Maps a template type id to its lever, if it has one.
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, lever)| *lever)
    }

    pub fn type_id(self) -> &'static str {
        match self {
            PolicyLever::IncreasePatrols => type_ids::INCREASE_PATROLS,
            PolicyLever::DecreasePatrols => type_ids::DECREASE_PATROLS,
            PolicyLever::OpenMarkets => type_ids::OPEN_MARKETS,
            PolicyLever::CloseMarkets => type_ids::CLOSE_MARKETS,
            PolicyLever::FieldRest => type_ids::FIELD_REST,
            PolicyLever::PushProduction => type_ids::PUSH_PRODUCTION,
            PolicyLever::Festival => type_ids::FESTIVAL,
        }
    }

    /// Fixed per-lever factors.
    pub fn factors(self) -> PolicyMults {
        let n = PolicyMults::NEUTRAL;
        match self {
            PolicyLever::IncreasePatrols => PolicyMults { guard_cost: 1.25, ..n },
            PolicyLever::DecreasePatrols => PolicyMults { guard_cost: 0.80, ..n },
            PolicyLever::OpenMarkets => PolicyMults {
                resource_in: 1.15,
                resource_out: 1.10,
                ..n
            },
            PolicyLever::CloseMarkets => PolicyMults {
                resource_in: 0.85,
                resource_out: 0.90,
                ..n
            },
            PolicyLever::FieldRest => PolicyMults { regen: 1.20, ..n },
            PolicyLever::PushProduction => PolicyMults {
                resource_out: 1.10,
                regen: 0.90,
                ..n
            },
            PolicyLever::Festival => PolicyMults { resource_out: 1.05, ..n },
        }
    }
}

/// Read-side facade over the store for stat calculators.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierResolver;

impl ModifierResolver {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate mods for a kingdom at `now`.
    pub fn mods(&self, store: &EventStore, kingdom: KingdomId, now: Tick) -> Mods {
        store.get_mods(kingdom, now)
    }

    /// Policy multipliers for a kingdom at `now`.
    pub fn policy_mults(&self, store: &EventStore, kingdom: KingdomId, now: Tick) -> PolicyMults {
        store
            .events(kingdom)
            .iter()
            .filter(|e| e.is_active(now))
            .filter_map(|e| PolicyLever::from_type_id(e.type_id.as_str()))
            .fold(PolicyMults::NEUTRAL, |acc, lever| acc.combine(lever.factors()))
    }

    /// Economy output after pressure: `base * economy_mult`.
    pub fn apply_economy(&self, store: &EventStore, kingdom: KingdomId, base: f64, now: Tick) -> f64 {
        base * self.mods(store, kingdom, now).economy_mult
    }
}

/// Folds the stat entries of active events into [`Mods`].
pub(crate) fn fold_mods<I>(effects: I) -> Mods
where
    I: IntoIterator<Item = (Stat, f64)>,
{
    let mut mods = Mods::NEUTRAL;
    for (stat, value) in effects {
        match stat {
            Stat::Economy => mods.economy_mult *= 1.0 + value,
            Stat::Happiness => mods.happiness_delta += value,
            Stat::Security => mods.security_delta += value,
            Stat::Relations => mods.relations_delta += value,
        }
    }
    mods.economy_mult = mods.economy_mult.max(ECONOMY_MULT_FLOOR);
    mods
}
