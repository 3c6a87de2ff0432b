//! History settings management
//!
//! Controls whether command history is persisted next to documents, how much
//! of it is kept, and how the in-memory stack is configured.

use crate::format::DEFAULT_HISTORY_SUFFIX;
use crate::Result;
use edit_engine::StackConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for command history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    /// Whether history is written next to documents
    pub enabled: bool,
    /// Maximum undo records written to a history file
    pub max_persisted_entries: Option<usize>,
    /// Suffix of the history file, `<document>.<suffix>`
    pub file_suffix: String,
    /// Configuration for in-memory stacks
    pub stack: StackConfig,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_persisted_entries: Some(500),
            file_suffix: DEFAULT_HISTORY_SUFFIX.to_string(),
            stack: StackConfig::default(),
        }
    }
}

/// Loads, saves, and updates [`HistorySettings`]
pub struct HistorySettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: HistorySettings,
}

impl HistorySettingsManager {
    /// Create a manager storing its file in `config_dir`
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join("history_settings.json"),
            current: HistorySettings::default(),
        }
    }

    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, or fall back to defaults if the file is missing or unreadable
    pub async fn load(&mut self) -> Result<&HistorySettings> {
        self.current = if self.settings_path.exists() {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            parse_or_default(&content)
        } else {
            HistorySettings::default()
        };
        Ok(&self.current)
    }

    /// Load settings synchronously (for use during startup)
    pub fn load_sync(&mut self) -> Result<&HistorySettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            parse_or_default(&content)
        } else {
            HistorySettings::default()
        };
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        tokio::fs::write(&self.settings_path, content).await?;
        Ok(())
    }

    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &HistorySettings {
        &self.current
    }

    /// Update settings and save to disk
    pub async fn update(&mut self, settings: HistorySettings) -> Result<()> {
        self.current = settings;
        self.save().await
    }

    pub fn update_sync(&mut self, settings: HistorySettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Reset settings to defaults and save
    pub async fn reset(&mut self) -> Result<&HistorySettings> {
        self.current = HistorySettings::default();
        self.save().await?;
        Ok(&self.current)
    }

    pub fn reset_sync(&mut self) -> Result<&HistorySettings> {
        self.current = HistorySettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

fn parse_or_default(content: &str) -> HistorySettings {
    match serde_json::from_str::<HistorySettings>(content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to parse history settings, using defaults: {}", e);
            HistorySettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = HistorySettings::default();

        assert!(settings.enabled);
        assert_eq!(settings.max_persisted_entries, Some(500));
        assert_eq!(settings.file_suffix, "history");
        assert_eq!(settings.stack.max_entries, None);
        assert!(!settings.stack.assert_positions);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: HistorySettings = serde_json::from_str(r#"{ "enabled": false }"#).unwrap();
        assert!(!parsed.enabled);
        assert_eq!(parsed.file_suffix, "history");
    }

    #[test]
    fn test_settings_manager_load_save_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = HistorySettingsManager::new(temp_dir.path().to_path_buf());

        let settings = manager.load_sync().unwrap();
        assert_eq!(settings, &HistorySettings::default());

        let updated = HistorySettings {
            file_suffix: "undo".to_string(),
            stack: StackConfig::default().with_max_entries(50),
            ..HistorySettings::default()
        };
        manager.update_sync(updated).unwrap();

        let mut manager2 = HistorySettingsManager::new(temp_dir.path().to_path_buf());
        let loaded = manager2.load_sync().unwrap();
        assert_eq!(loaded.file_suffix, "undo");
        assert_eq!(loaded.stack.max_entries, Some(50));
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = HistorySettingsManager::new(temp_dir.path().to_path_buf());
        std::fs::write(manager.settings_path(), "{ not json").unwrap();

        assert_eq!(manager.load_sync().unwrap(), &HistorySettings::default());
    }

    #[test]
    fn test_settings_manager_reset_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = HistorySettingsManager::new(temp_dir.path().to_path_buf());

        let disabled = HistorySettings {
            enabled: false,
            ..HistorySettings::default()
        };
        manager.update_sync(disabled).unwrap();

        let settings = manager.reset_sync().unwrap();
        assert!(settings.enabled);
    }

    #[tokio::test]
    async fn test_settings_manager_async() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = HistorySettingsManager::new(temp_dir.path().to_path_buf());

        manager.load().await.unwrap();

        let updated = HistorySettings {
            max_persisted_entries: None,
            ..HistorySettings::default()
        };
        manager.update(updated).await.unwrap();

        let mut manager2 = HistorySettingsManager::new(temp_dir.path().to_path_buf());
        let loaded = manager2.load().await.unwrap();
        assert_eq!(loaded.max_persisted_entries, None);
    }
}
