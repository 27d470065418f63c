//! Resource economy.
//!
//! Faction resource pools, per-turn harvesting of owned planets, and the
//! auto-distribution strategies that share the pool between factions.

pub mod distribute;
pub mod harvest;
pub mod ledger;

pub use distribute::{
    distribute, AutoDistributionConfig, CustomDistributionMode, CustomModes, DistributionMode,
    DistributionOutcome,
};
pub use harvest::{harvest, HarvestReport, Modifier, PlanetModifiers};
pub use ledger::{Allocation, Pool, ResourceLedger};
