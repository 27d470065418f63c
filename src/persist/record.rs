//! The versioned save record.
//!
//! Every field defaults when absent, so older or partial saves load into an
//! initial state instead of failing. Records written by a newer schema are
//! rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::directive::{GalacticOrder, LiberationProgress};
use crate::economy::{AutoDistributionConfig, CustomModes, PlanetModifiers, ResourceLedger};
use crate::galaxy::{GalaxyCenter, GalaxyEvent, Planet, Sector, Ship};
use crate::stratagem::CooldownTable;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Galactic order state as saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderRecord {
    pub current: Option<GalacticOrder>,
    pub completed_history: Vec<GalacticOrder>,
    pub liberation_progress: LiberationProgress,
}

/// A complete campaign snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Zero for saves that predate versioning.
    pub version: u32,
    pub id: String,
    pub name: String,
    pub turn: u32,
    pub planets: Vec<Planet>,
    pub events: Vec<GalaxyEvent>,
    pub galaxy_center: GalaxyCenter,
    pub ships: Vec<Ship>,
    pub sectors: Vec<Sector>,
    pub player_resources: ResourceLedger,
    pub planet_modifiers: PlanetModifiers,
    pub galactic_order: OrderRecord,
    pub stratagem_cooldowns: CooldownTable,
    pub auto_distribution: AutoDistributionConfig,
    pub custom_distribution_modes: CustomModes,
    pub custom_text: BTreeMap<String, String>,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub last_modified: i64,
}

impl CampaignRecord {
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a record, rejecting versions newer than [`SCHEMA_VERSION`].
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let record: CampaignRecord = serde_json::from_str(json)?;
        if record.version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: record.version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(record)
    }
}
