//! Save-record storage backends.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::record::CampaignRecord;
use super::StoreError;

/// Where campaign records are saved to and loaded from.
pub trait CampaignStore {
    fn save(&mut self, record: &CampaignRecord) -> Result<(), StoreError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<CampaignRecord>, StoreError>;
}

/// Stores one record as pretty-printed JSON in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CampaignStore for JsonFileStore {
    fn save(&mut self, record: &CampaignRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        // Write then rename so a failed save never truncates the previous one.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn load(&self) -> Result<Option<CampaignRecord>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => CampaignRecord::from_json(&data).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Keeps the serialized record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// The raw JSON last saved, if any.
    pub fn raw(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Replaces the stored JSON, e.g. to simulate a hand-edited save.
    pub fn set_raw(&mut self, json: impl Into<String>) {
        self.data = Some(json.into());
    }
}

impl CampaignStore for MemoryStore {
    fn save(&mut self, record: &CampaignRecord) -> Result<(), StoreError> {
        self.data = Some(record.to_json()?);
        Ok(())
    }

    fn load(&self) -> Result<Option<CampaignRecord>, StoreError> {
        self.data
            .as_deref()
            .map(CampaignRecord::from_json)
            .transpose()
    }
}
