//! Campaign persistence.
//!
//! A plain structured record (see [`record::CampaignRecord`]) and the stores
//! that hold it.

pub mod record;
pub mod store;

pub use record::{CampaignRecord, OrderRecord, SCHEMA_VERSION};
pub use store::{CampaignStore, JsonFileStore, MemoryStore};

/// Errors that can occur while saving or loading a campaign.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed campaign JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save uses schema version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
