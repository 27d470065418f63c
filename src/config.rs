//! Campaign configuration.
//!
//! Every field has a default, so a config file only needs to name the values
//! it overrides. Loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Galaxy generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Number of planets placed by a fresh generation.
    pub planet_count: usize,
    /// Radius of the galactic disc.
    pub radius: f64,
    /// Maximum height above or below the plane.
    pub thickness: f64,
    /// Number of spiral arms planets are scattered along.
    pub arm_count: u32,
    /// Upper bound on nearest-neighbour links made per planet.
    pub max_neighbors: usize,
    /// Planets further apart than this are not linked by the neighbour pass.
    pub connection_threshold: f64,
    /// Planets closer than this at placement are nudged apart.
    pub min_separation: f64,
    /// Largest per-axis nudge applied to a crowded planet.
    pub nudge: f64,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        GalaxyConfig {
            planet_count: 20,
            radius: 100.0,
            thickness: 8.0,
            arm_count: 3,
            max_neighbors: 4,
            connection_threshold: 40.0,
            min_separation: 5.0,
            nudge: 6.0,
        }
    }
}

/// Galactic order parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Days between issuing an order and its expiry. One day elapses per turn.
    pub lifetime_days: u32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        OrderConfig { lifetime_days: 7 }
    }
}

/// Top-level configuration for a campaign.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub galaxy: GalaxyConfig,
    pub orders: OrderConfig,
    /// Resource ids known to the economy. Empty means "use the placeholder set".
    pub resources: Vec<String>,
}

impl CampaignConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CampaignConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.galaxy;
        if g.max_neighbors == 0 {
            return Err(ConfigError::Invalid {
                field: "galaxy.max_neighbors",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(g.connection_threshold > 0.0) {
            return Err(ConfigError::Invalid {
                field: "galaxy.connection_threshold",
                reason: format!("must be positive, got {}", g.connection_threshold),
            });
        }
        if !(g.radius >= 0.0) || !(g.thickness >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "galaxy.radius",
                reason: "radius and thickness must be non-negative".to_string(),
            });
        }
        if !(g.min_separation >= 0.0) || !(g.nudge >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "galaxy.min_separation",
                reason: "separation and nudge must be non-negative".to_string(),
            });
        }
        if g.arm_count == 0 {
            return Err(ConfigError::Invalid {
                field: "galaxy.arm_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.orders.lifetime_days == 0 {
            return Err(ConfigError::Invalid {
                field: "orders.lifetime_days",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
