//! Backup document export/import
//!
//! Export is on demand. Import only parses and validates; nothing in the
//! sync path consumes an imported backup.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Entry, TasteProfile};
use crate::{Error, Result};

/// Serialized backup: `{ entries, analysis, lastBackup }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub entries: Vec<Entry>,
    pub analysis: Option<TasteProfile>,
    /// Import time when the document carries no stamp
    #[serde(default = "Utc::now")]
    pub last_backup: DateTime<Utc>,
}

impl Backup {
    /// Snapshot `entries` and `analysis`, stamped with the current time
    pub fn new(entries: Vec<Entry>, analysis: Option<TasteProfile>) -> Self {
        Self {
            entries,
            analysis,
            last_backup: Utc::now(),
        }
    }

    /// File name for this backup: `cinelog-backup-YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!("cinelog-backup-{}.json", self.last_backup.format("%Y-%m-%d"))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the backup into `dir`, returning the full path
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?)?;
        info!(path = %path.display(), entries = self.entries.len(), "Backup written");
        Ok(path)
    }

    /// Parse a backup document; `entries` must be an array
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.get("entries").is_some_and(|e| e.is_array()) {
            return Err(Error::InvalidInput("invalid backup format".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
