//! History files stored next to documents

use crate::{capture, restore, CommandSerializer, HistorySettings, LoadedHistory, PersistedHistory, Result, StoreError};
use doc_model::{ContentCodec, FileId};
use edit_engine::CommandStack;
use std::path::{Path, PathBuf};

/// The history file belonging to one document, `<document>.<suffix>`
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
    enabled: bool,
    max_persisted_entries: Option<usize>,
}

impl HistoryFile {
    pub fn for_document(document_path: impl AsRef<Path>, settings: &HistorySettings) -> Self {
        let mut path = document_path.as_ref().as_os_str().to_owned();
        path.push(".");
        path.push(&settings.file_suffix);
        Self {
            path: PathBuf::from(path),
            enabled: settings.enabled,
            max_persisted_entries: settings.max_persisted_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Whether history persistence is turned on. When it is off, saving
    /// writes nothing and loading finds nothing.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Write history, dropping the oldest undo records beyond the configured limit
    pub async fn save(&self, history: &PersistedHistory) -> Result<()> {
        if !self.enabled {
            tracing::debug!("History persistence disabled, not writing {}", self.path.display());
            return Ok(());
        }
        let json = self.to_json(history)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("Saved {} history records to {}", history.len(), self.path.display());
        Ok(())
    }

    pub fn save_sync(&self, history: &PersistedHistory) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let json = self.to_json(history)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Read history. Returns `None` if the document has no history file.
    pub async fn load(&self) -> Result<Option<PersistedHistory>> {
        if !self.enabled || !self.path.exists() {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&self.path).await?;
        parse(&json).map(Some)
    }

    pub fn load_sync(&self) -> Result<Option<PersistedHistory>> {
        if !self.enabled || !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        parse(&json).map(Some)
    }

    /// Capture and write a stack
    pub async fn save_stack<C: ContentCodec>(&self, stack: &CommandStack, serializer: &CommandSerializer<C>) -> Result<()> {
        self.save(&capture(stack, serializer)?).await
    }

    /// Read and restore a stack for `target`
    pub async fn load_stack<C: ContentCodec>(
        &self,
        target: FileId,
        settings: &HistorySettings,
        serializer: &CommandSerializer<C>,
    ) -> Result<Option<LoadedHistory>> {
        match self.load().await? {
            Some(history) => restore(&history, target, settings.stack.clone(), serializer).map(Some),
            None => Ok(None),
        }
    }

    /// Delete the history file if present
    pub async fn remove(&self) -> Result<()> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    fn to_json(&self, history: &PersistedHistory) -> Result<String> {
        match self.max_persisted_entries {
            Some(max) if history.undo.len() > max => {
                let mut trimmed = history.clone();
                trimmed.truncate_undo(max);
                Ok(serde_json::to_string_pretty(&trimmed)?)
            }
            _ => Ok(serde_json::to_string_pretty(history)?),
        }
    }
}

fn parse(json: &str) -> Result<PersistedHistory> {
    let history: PersistedHistory = serde_json::from_str(json)?;
    if !history.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "unsupported history header '{}' v{}",
            history.header.magic, history.header.version
        )));
    }
    Ok(history)
}
