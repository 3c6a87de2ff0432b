//! History file format

use crate::CommandRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// History format version
pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// Default suffix appended to a document path for its history file
pub const DEFAULT_HISTORY_SUFFIX: &str = "history";

/// Header for format identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryHeader {
    /// Magic string for format identification
    pub magic: String,
    /// Format version
    pub version: u32,
    /// When the history was written
    pub saved: DateTime<Utc>,
}

impl HistoryHeader {
    pub const MAGIC: &'static str = "RTC-HISTORY";

    pub fn new() -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: HISTORY_FORMAT_VERSION,
            saved: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version <= HISTORY_FORMAT_VERSION
    }
}

impl Default for HistoryHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Both sides of a command stack in persisted form.
///
/// Each side is ordered oldest first: the last undo record is the next
/// command to undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedHistory {
    pub header: HistoryHeader,
    #[serde(default)]
    pub undo: Vec<CommandRecord>,
    #[serde(default)]
    pub redo: Vec<CommandRecord>,
}

impl PersistedHistory {
    pub fn new(undo: Vec<CommandRecord>, redo: Vec<CommandRecord>) -> Self {
        Self {
            header: HistoryHeader::new(),
            undo,
            redo,
        }
    }

    pub fn len(&self) -> usize {
        self.undo.len() + self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Keep at most `max` undo records, dropping the oldest
    pub fn truncate_undo(&mut self, max: usize) {
        if self.undo.len() > max {
            let excess = self.undo.len() - max;
            self.undo.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_validity() {
        let header = HistoryHeader::new();
        assert!(header.is_valid());

        let newer = HistoryHeader {
            version: HISTORY_FORMAT_VERSION + 1,
            ..HistoryHeader::new()
        };
        assert!(!newer.is_valid());

        let foreign = HistoryHeader {
            magic: "MSWORD-DOC".to_string(),
            ..HistoryHeader::new()
        };
        assert!(!foreign.is_valid());
    }

    #[test]
    fn test_missing_sides_default_to_empty() {
        let json = serde_json::json!({
            "header": { "magic": "RTC-HISTORY", "version": 1, "saved": "2024-01-01T00:00:00Z" }
        });
        let history: PersistedHistory = serde_json::from_value(json).unwrap();
        assert!(history.is_empty());
        assert!(history.header.is_valid());
    }
}
