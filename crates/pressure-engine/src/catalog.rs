//! Template catalog.
//!
//! An immutable registry of event templates keyed by type id. The catalog
//! is populated once at startup (from code or a TOML file) and then only
//! read. Unknown type ids resolve to `None`; callers treat that as a
//! silent no-op.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

use pressure_events::{Effects, RelationScope, Stat, Tick, TypeId};

/// Well-known template type ids.
pub mod type_ids {
    // Domestic policy
    pub const PUSH_PRODUCTION: &str = "push_production";
    pub const EASE_LABOR: &str = "ease_labor";
    pub const INCREASE_PATROLS: &str = "increase_patrols";
    pub const DECREASE_PATROLS: &str = "decrease_patrols";
    pub const OPEN_MARKETS: &str = "open_markets";
    pub const CLOSE_MARKETS: &str = "close_markets";
    pub const FIELD_REST: &str = "field_rest";
    pub const FESTIVAL: &str = "festival";

    // Diplomacy
    pub const GIFT_SENT: &str = "gift_sent";
    pub const GIFT_RECEIVED: &str = "gift_received";
    pub const ENVOY_PRAISE: &str = "envoy_praise";
    pub const INSULT_SENT: &str = "insult_sent";
    pub const INSULT_RECEIVED: &str = "insult_received";

    // Trade
    pub const TRADE_PACT: &str = "trade_pact";
    pub const EMBARGO_IMPOSED: &str = "embargo_imposed";
    pub const EMBARGO: &str = "embargo";

    // Military
    pub const THREAT_MADE: &str = "threat_made";
    pub const THREAT_ISSUED: &str = "threat_issued";
    pub const BORDER_RAID: &str = "border_raid";
    pub const WAR_GRIEVANCE: &str = "war_grievance";
    pub const ALLY_SUPPORT: &str = "ally_support";
    pub const AID_GIVEN: &str = "aid_given";
    pub const TRIBUTE_COLLECTED: &str = "tribute_collected";
    pub const TRIBUTE_DEMAND: &str = "tribute_demand";

    // AI-to-AI gossip
    pub const RAPPORT: &str = "rapport";
    pub const SLANDER: &str = "slander";
    pub const RIVALRY: &str = "rivalry";

    // World events
    pub const BOUNTIFUL_HARVEST: &str = "bountiful_harvest";
    pub const DROUGHT: &str = "drought";
    pub const PLAGUE: &str = "plague";
    pub const BANDIT_SEASON: &str = "bandit_season";
    pub const TRADE_BOOM: &str = "trade_boom";
}

/// Bark group announced to the affected kingdom's ruler.
pub const HERALD_GROUP: &str = "herald";
/// Bark group spoken by the envoy that carried the pressure.
pub const ENVOY_GROUP: &str = "envoy";

/// An immutable, reusable definition of an event's duration and effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub type_id: TypeId,
    /// Lifetime of events created from this template, in ticks
    pub duration: Tick,
    #[serde(default)]
    pub effects: Effects,
    /// Default relation scope for events created from this template
    #[serde(default)]
    pub scope: RelationScope,
    /// Templates sharing a group supersede each other on the same kingdom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_group: Option<String>,
    /// Flavor pools by bark group (e.g. "herald" -> "raid_warning")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bark_pools: BTreeMap<String, String>,
}

impl EventTemplate {
    pub fn new(type_id: impl Into<TypeId>, duration: Tick, effects: Effects) -> Self {
        Self {
            type_id: type_id.into(),
            duration,
            effects,
            scope: RelationScope::Global,
            exclusive_group: None,
            bark_pools: BTreeMap::new(),
        }
    }

    pub fn with_scope(mut self, scope: RelationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn causer_only(self) -> Self {
        self.with_scope(RelationScope::CauserOnly)
    }

    pub fn with_exclusive_group(mut self, group: impl Into<String>) -> Self {
        self.exclusive_group = Some(group.into());
        self
    }

    /// Returns a copy of this template with an added bark group -> pool mapping.
    pub fn with_bark(&self, group: impl Into<String>, pool: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.bark_pools.insert(group.into(), pool.into());
        copy
    }

    /// Pool id for a bark group, if the template has one.
    pub fn bark_pool(&self, group: &str) -> Option<&str> {
        self.bark_pools.get(group).map(String::as_str)
    }

    pub fn effect(&self, stat: Stat) -> f64 {
        self.effects.get(stat)
    }
}

/// On-disk layout of a catalog file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "template")]
    templates: Vec<EventTemplate>,
}

/// Registry of event templates keyed by type id.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<TypeId, EventTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template by type id, replacing any previous registration.
    pub fn register(&mut self, template: EventTemplate) -> &EventTemplate {
        let key = template.type_id.clone();
        self.templates.insert(key.clone(), template);
        &self.templates[&key]
    }

    /// Looks up a template. Unknown ids return `None`.
    pub fn by_type_id(&self, type_id: &str) -> Option<&EventTemplate> {
        self.templates.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.templates.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventTemplate> {
        self.templates.values()
    }

    /// Loads a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses a catalog from a TOML string of `[[template]]` tables.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut seen = HashSet::new();
        let mut catalog = Self::new();
        for template in file.templates {
            if !seen.insert(template.type_id.clone()) {
                return Err(CatalogError::DuplicateTypeId(template.type_id));
            }
            catalog.register(template);
        }
        Ok(catalog)
    }

    /// Serializes the catalog as TOML.
    pub fn to_toml(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            templates: self.templates.values().cloned().collect(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// The same type id appears twice in one file
    #[error("duplicate template type id: {0}")]
    DuplicateTypeId(TypeId),
}

fn effects(pairs: &[(Stat, f64)]) -> Effects {
    pairs.iter().copied().collect()
}

/// Builds the game's built-in template catalog.
pub fn default_catalog() -> TemplateCatalog {
    use type_ids::*;
    use Stat::{Economy, Happiness, Relations, Security};

    let mut catalog = TemplateCatalog::new();

    // Domestic policy
    let policies = [
        EventTemplate::new(PUSH_PRODUCTION, 600, effects(&[(Economy, 0.12), (Happiness, -0.6)]))
            .with_exclusive_group("production"),
        EventTemplate::new(EASE_LABOR, 600, effects(&[(Economy, -0.05), (Happiness, 0.5)]))
            .with_exclusive_group("production"),
        EventTemplate::new(INCREASE_PATROLS, 800, effects(&[(Security, 1.0)]))
            .with_exclusive_group("patrols"),
        EventTemplate::new(DECREASE_PATROLS, 800, effects(&[(Security, -0.8), (Happiness, 0.2)]))
            .with_exclusive_group("patrols"),
        EventTemplate::new(OPEN_MARKETS, 900, effects(&[(Economy, 0.05)]))
            .with_exclusive_group("markets"),
        EventTemplate::new(CLOSE_MARKETS, 900, effects(&[(Economy, -0.04), (Security, 0.3)]))
            .with_exclusive_group("markets"),
        EventTemplate::new(FIELD_REST, 1200, effects(&[(Economy, -0.04)])),
        EventTemplate::new(FESTIVAL, 300, effects(&[(Happiness, 1.2), (Economy, -0.06)])),
    ];
    for template in policies {
        catalog.register(template.with_bark(HERALD_GROUP, "policy_enacted"));
    }

    // Player-visible side of outgoing actions
    catalog.register(EventTemplate::new(GIFT_SENT, 300, effects(&[(Economy, -0.03)])));
    catalog.register(EventTemplate::new(INSULT_SENT, 400, effects(&[(Happiness, 0.2)])));
    catalog.register(EventTemplate::new(EMBARGO_IMPOSED, 1200, effects(&[(Economy, -0.02)])));
    catalog.register(EventTemplate::new(THREAT_MADE, 700, effects(&[(Security, 0.3)])));
    catalog.register(EventTemplate::new(AID_GIVEN, 800, effects(&[(Security, -0.3)])));
    catalog.register(EventTemplate::new(TRIBUTE_COLLECTED, 900, effects(&[(Economy, 0.06)])));

    // Pressure received from a specific counterpart
    let received = [
        (EventTemplate::new(GIFT_RECEIVED, 900, effects(&[(Relations, 6.0), (Happiness, 0.2)])), "gift"),
        (EventTemplate::new(ENVOY_PRAISE, 600, effects(&[(Relations, 3.0)])), "praise"),
        (EventTemplate::new(INSULT_RECEIVED, 900, effects(&[(Relations, -8.0)])), "insult"),
        (EventTemplate::new(TRADE_PACT, 1200, effects(&[(Relations, 4.0), (Economy, 0.05)])), "trade"),
        (EventTemplate::new(EMBARGO, 1200, effects(&[(Economy, -0.08), (Relations, -5.0)])), "embargo"),
        (EventTemplate::new(THREAT_ISSUED, 700, effects(&[(Security, -0.5), (Relations, -6.0)])), "threat"),
        (
            EventTemplate::new(
                BORDER_RAID,
                600,
                effects(&[(Security, -1.5), (Economy, -0.04), (Relations, -10.0)]),
            ),
            "raid",
        ),
        (EventTemplate::new(WAR_GRIEVANCE, 900, effects(&[(Relations, -5.0)])), "grievance"),
        (EventTemplate::new(ALLY_SUPPORT, 800, effects(&[(Security, 0.8), (Relations, 5.0)])), "aid"),
        (
            EventTemplate::new(TRIBUTE_DEMAND, 900, effects(&[(Economy, -0.06), (Relations, -7.0)])),
            "tribute",
        ),
        (EventTemplate::new(RAPPORT, 1000, effects(&[(Relations, 4.0)])), "rapport"),
        (EventTemplate::new(SLANDER, 1000, effects(&[(Relations, -4.0)])), "slander"),
        (EventTemplate::new(RIVALRY, 1000, effects(&[(Relations, -6.0)])), "rivalry"),
    ];
    for (template, pool) in received {
        catalog.register(
            template
                .causer_only()
                .with_bark(HERALD_GROUP, pool)
                .with_bark(ENVOY_GROUP, format!("{}_envoy", pool)),
        );
    }

    // World events
    let world = [
        (EventTemplate::new(BOUNTIFUL_HARVEST, 1500, effects(&[(Economy, 0.08), (Happiness, 0.3)])), "harvest"),
        (EventTemplate::new(DROUGHT, 1500, effects(&[(Economy, -0.10), (Happiness, -0.4)])), "drought"),
        (
            EventTemplate::new(PLAGUE, 1200, effects(&[(Happiness, -0.8), (Economy, -0.06), (Security, -0.3)])),
            "plague",
        ),
        (EventTemplate::new(BANDIT_SEASON, 1000, effects(&[(Security, -1.0)])), "bandits"),
        (EventTemplate::new(TRADE_BOOM, 1200, effects(&[(Economy, 0.06)])), "boom"),
    ];
    for (template, pool) in world {
        catalog.register(template.with_bark(HERALD_GROUP, pool));
    }

    catalog
}

/// Returns the built-in catalog as TOML.
pub fn default_catalog_toml() -> Result<String, CatalogError> {
    default_catalog().to_toml()
}
