//! Galactic campaign simulation core.
//!
//! Exposes the galaxy model, economy, galactic orders, stratagems, fleet
//! navigation, and the turn orchestrator for use by integration tests and
//! the `simulate` binary.

pub mod campaign;
pub mod clock;
pub mod config;
pub mod directive;
pub mod economy;
pub mod galaxy;
pub mod navigation;
pub mod persist;
pub mod stratagem;

pub use campaign::{Campaign, TurnReport};
pub use clock::Clock;
pub use config::{CampaignConfig, ConfigError};
pub use persist::{CampaignRecord, CampaignStore, JsonFileStore, MemoryStore, StoreError};
