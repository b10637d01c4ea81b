//! Configuration loading for the pressure engine.
//!
//! All scheduler and persistence tunables are loaded from a TOML file.
//! Every section is optional; missing values fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use pressure_events::Tick;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// AI-to-player pressure scheduling
    #[serde(default)]
    pub player_pressure: PlayerPressureConfig,
    /// AI-to-AI gossip scheduling
    #[serde(default)]
    pub gossip: GossipConfig,
    /// World-wide event scheduling
    #[serde(default)]
    pub world_events: WorldEventConfig,
    /// Snapshot persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Shared timing knobs for a periodic, jittered scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceConfig {
    /// Base ticks between two eligibility checks for one subject
    pub interval: Tick,
    /// Maximum +/- deviation applied to each reschedule
    pub jitter: Tick,
    /// Minimum ticks between two firings of any subject
    pub global_cooldown: Tick,
    /// Minimum ticks between two firings caused by the same kingdom
    pub per_causer_cooldown: Tick,
}

/// AI-to-player pressure configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerPressureConfig {
    pub interval: Tick,
    pub jitter: Tick,
    pub global_cooldown: Tick,
    pub per_causer_cooldown: Tick,
    /// Hostile branch weight when the AI is at war with the player
    pub hostile_at_war: f64,
    /// Friendly branch weight when the AI is allied with the player
    pub friendly_when_allied: f64,
    /// Extra hostile weight when an ally of the AI is at war with the player
    pub ally_solidarity_bonus: f64,
    /// Raids need at least this fraction of the player's soldiers
    pub raid_strength_ratio: f64,
    /// Gold taken from the player's ledger by a raid
    pub raid_gold_loss: f64,
    /// Gold added to the player's ledger by a gift
    pub gift_gold: f64,
}

impl Default for PlayerPressureConfig {
    fn default() -> Self {
        Self {
            interval: 400,
            jitter: 80,
            global_cooldown: 60,
            per_causer_cooldown: 800,
            hostile_at_war: 0.75,
            friendly_when_allied: 0.70,
            ally_solidarity_bonus: 0.25,
            raid_strength_ratio: 0.5,
            raid_gold_loss: 40.0,
            gift_gold: 25.0,
        }
    }
}

impl PlayerPressureConfig {
    pub fn cadence(&self) -> CadenceConfig {
        CadenceConfig {
            interval: self.interval,
            jitter: self.jitter,
            global_cooldown: self.global_cooldown,
            per_causer_cooldown: self.per_causer_cooldown,
        }
    }
}

/// AI-to-AI gossip configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GossipConfig {
    pub interval: Tick,
    pub jitter: Tick,
    pub global_cooldown: Tick,
    pub per_causer_cooldown: Tick,
    /// Happiness nudge applied to both sides of a rapport exchange
    pub rapport_happiness_fuzz: f64,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            interval: 500,
            jitter: 120,
            global_cooldown: 40,
            per_causer_cooldown: 1000,
            rapport_happiness_fuzz: 0.1,
        }
    }
}

impl GossipConfig {
    pub fn cadence(&self) -> CadenceConfig {
        CadenceConfig {
            interval: self.interval,
            jitter: self.jitter,
            global_cooldown: self.global_cooldown,
            per_causer_cooldown: self.per_causer_cooldown,
        }
    }
}

/// World-wide event configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldEventConfig {
    pub interval: Tick,
    pub jitter: Tick,
    pub global_cooldown: Tick,
    pub per_causer_cooldown: Tick,
    /// Chance that a due kingdom actually receives a world event
    pub fire_chance: f64,
}

impl Default for WorldEventConfig {
    fn default() -> Self {
        Self {
            interval: 1500,
            jitter: 300,
            global_cooldown: 200,
            per_causer_cooldown: 2000,
            fire_chance: 0.35,
        }
    }
}

impl WorldEventConfig {
    pub fn cadence(&self) -> CadenceConfig {
        CadenceConfig {
            interval: self.interval,
            jitter: self.jitter,
            global_cooldown: self.global_cooldown,
            per_causer_cooldown: self.per_causer_cooldown,
        }
    }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Minimum ticks between two saves of a dirty store
    pub debounce_ticks: Tick,
    /// Where the snapshot is written; `None` disables saving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ticks: 250,
            path: None,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Pressure Engine Configuration

[player_pressure]
interval = 400
jitter = 80
global_cooldown = 60
per_causer_cooldown = 800
hostile_at_war = 0.75
friendly_when_allied = 0.7
ally_solidarity_bonus = 0.25
raid_strength_ratio = 0.5
raid_gold_loss = 40.0
gift_gold = 25.0

[gossip]
interval = 500
jitter = 120
global_cooldown = 40
per_causer_cooldown = 1000
rapport_happiness_fuzz = 0.1

[world_events]
interval = 1500
jitter = 300
global_cooldown = 200
per_causer_cooldown = 2000
fire_chance = 0.35

[persistence]
debounce_ticks = 250
"#
    .to_string()
}
