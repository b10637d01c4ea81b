//! Flavor-text pools.
//!
//! Pure data: pool id -> list of lines. The engine never inspects line
//! content; it only stores pool ids on templates and actions and picks a
//! line when a pressure event is announced.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Speech and herald lines keyed by pool id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarkPools {
    #[serde(default)]
    pub pools: HashMap<String, Vec<String>>,
}

impl BarkPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads pools from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, BarkError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses pools from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, BarkError> {
        Ok(toml::from_str(content)?)
    }

    pub fn insert(&mut self, pool_id: impl Into<String>, lines: Vec<String>) {
        self.pools.insert(pool_id.into(), lines);
    }

    /// Adds every pool from `other`, replacing pools with the same id.
    pub fn merge(&mut self, other: BarkPools) {
        self.pools.extend(other.pools);
    }

    pub fn lines(&self, pool_id: &str) -> &[String] {
        self.pools.get(pool_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Picks a random line from a pool. Unknown or empty pools yield `None`.
    pub fn pick<R: Rng + ?Sized>(&self, pool_id: &str, rng: &mut R) -> Option<&str> {
        self.lines(pool_id).choose(rng).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Errors that can occur while loading bark pools.
#[derive(Debug, Error)]
pub enum BarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Built-in bark pools.
pub fn default_barks() -> BarkPools {
    let mut barks = BarkPools::new();

    let table: &[(&str, &[&str])] = &[
        ("policy_enacted", &["The decree is proclaimed in every square.", "Your will is done, sire."]),
        ("gift", &["A caravan arrives bearing gifts.", "Our neighbours send tokens of friendship."]),
        ("gift_envoy", &["Accept this with our king's regards.", "A small token between friends."]),
        ("praise", &["Foreign envoys speak well of us."]),
        ("praise_envoy", &["Your court is the envy of the realm."]),
        ("insult", &["An envoy delivers a grave insult.", "They mock our banners openly."]),
        ("insult_envoy", &["My king finds your court... provincial."]),
        ("trade", &["Merchants rejoice at the new pact."]),
        ("trade_envoy", &["Let our roads carry more than soldiers."]),
        ("embargo", &["Their ports are closed to our ships.", "The markets stand empty."]),
        ("embargo_envoy", &["Not a sack of grain will cross our border."]),
        ("threat", &["Their envoy speaks of steel and fire."]),
        ("threat_envoy", &["Think carefully before you answer."]),
        ("raid", &["Raiders burn our border farms!", "Smoke rises over the frontier."]),
        ("raid_envoy", &["Your borders are poorly watched."]),
        ("grievance", &["They will not forget this war."]),
        ("grievance_envoy", &["Every grave is a debt."]),
        ("aid", &["Allied banners march to our aid."]),
        ("aid_envoy", &["We stand with you."]),
        ("tribute", &["Tax collectors from abroad demand their due."]),
        ("tribute_envoy", &["Pay, and there will be peace."]),
        ("rapport", &["The two courts exchange warm letters."]),
        ("rapport_envoy", &["A fine evening of wine and talk."]),
        ("slander", &["Whispers spread in foreign courts."]),
        ("slander_envoy", &["I heard the strangest tale about your king."]),
        ("rivalry", &["Old hatreds stir between the crowns."]),
        ("rivalry_envoy", &["Our swords remember."]),
        ("harvest", &["The granaries overflow this year."]),
        ("drought", &["The rivers run low and the fields crack."]),
        ("plague", &["Sickness spreads through the towns."]),
        ("bandits", &["Bandits prowl the king's roads."]),
        ("boom", &["Coin flows freely through the markets."]),
    ];

    for (pool, lines) in table {
        barks.insert(*pool, lines.iter().map(|l| l.to_string()).collect());
    }

    barks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_from_known_pool() {
        let barks = default_barks();
        let mut rng = SmallRng::seed_from_u64(7);

        let line = barks.pick("raid", &mut rng).unwrap();
        assert!(barks.lines("raid").iter().any(|l| l == line));
    }

    #[test]
    fn test_unknown_pool_is_none() {
        let barks = default_barks();
        let mut rng = SmallRng::seed_from_u64(7);

        assert!(barks.pick("no_such_pool", &mut rng).is_none());
        assert!(barks.lines("no_such_pool").is_empty());
    }

    #[test]
    fn test_parse_pools_from_toml() {
        let toml = r#"
            [pools]
            dragon = ["A shadow passes over the keep.", "The herds are gone."]
        "#;

        let barks = BarkPools::from_str(toml).unwrap();
        assert_eq!(barks.lines("dragon").len(), 2);
    }

    #[test]
    fn test_merge_overrides() {
        let mut barks = default_barks();
        let mut custom = BarkPools::new();
        custom.insert("raid", vec!["Custom raid line".to_string()]);

        barks.merge(custom);
        assert_eq!(barks.lines("raid"), &["Custom raid line".to_string()]);
        assert!(!barks.lines("drought").is_empty());
    }

    #[test]
    fn test_every_default_template_pool_exists() {
        let barks = default_barks();
        for template in crate::catalog::default_catalog().iter() {
            for pool in template.bark_pools.values() {
                assert!(!barks.lines(pool).is_empty(), "missing pool {}", pool);
            }
        }
    }
}
