//! Formatting commands
//!
//! Formatting commands carry full styled snapshots of the document before and
//! after the change. Applying or reversing one sets the content to the stored
//! snapshot, so attributes come back exactly as they were.

use crate::{ContentEdit, Result};
use doc_model::{AttributeKey, AttributeSet, DocumentContent, TextRange};

/// Styled before/after snapshots shared by the formatting commands
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSnapshots {
    /// The range the user acted on
    pub range: TextRange,
    pub before: DocumentContent,
    pub after: DocumentContent,
}

/// Apply character attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyFormat(pub FormatSnapshots);

/// Remove character attributes
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveFormat(pub FormatSnapshots);

impl ApplyFormat {
    pub fn from_snapshots(range: impl Into<TextRange>, before: DocumentContent, after: DocumentContent) -> Self {
        Self(FormatSnapshots {
            range: range.into(),
            before,
            after,
        })
    }

    /// Snapshot `content`, then layer `attributes` over `range`
    pub fn over_range(content: &DocumentContent, range: impl Into<TextRange>, attributes: &AttributeSet) -> Result<Self> {
        let range = range.into();
        let mut after = content.clone();
        after.apply_attributes(range, attributes)?;
        Ok(Self::from_snapshots(range, content.clone(), after))
    }

    pub fn snapshots(&self) -> &FormatSnapshots {
        &self.0
    }
}

impl RemoveFormat {
    pub fn from_snapshots(range: impl Into<TextRange>, before: DocumentContent, after: DocumentContent) -> Self {
        Self(FormatSnapshots {
            range: range.into(),
            before,
            after,
        })
    }

    /// Snapshot `content`, then clear `keys` over `range`
    pub fn over_range(content: &DocumentContent, range: impl Into<TextRange>, keys: &[AttributeKey]) -> Result<Self> {
        let range = range.into();
        let mut after = content.clone();
        after.remove_attributes(range, keys)?;
        Ok(Self::from_snapshots(range, content.clone(), after))
    }

    /// Snapshot `content`, then clear every attribute over `range`
    pub fn clear_all(content: &DocumentContent, range: impl Into<TextRange>) -> Result<Self> {
        Self::over_range(content, range, &AttributeKey::ALL)
    }

    pub fn snapshots(&self) -> &FormatSnapshots {
        &self.0
    }
}

impl ContentEdit for ApplyFormat {
    fn apply(&self, _content: DocumentContent) -> Result<DocumentContent> {
        Ok(self.0.after.clone())
    }

    fn revert(&self, _content: DocumentContent) -> Result<DocumentContent> {
        Ok(self.0.before.clone())
    }

    fn display_name(&self) -> &'static str {
        "Apply Formatting"
    }
}

impl ContentEdit for RemoveFormat {
    fn apply(&self, _content: DocumentContent) -> Result<DocumentContent> {
        Ok(self.0.after.clone())
    }

    fn revert(&self, _content: DocumentContent) -> Result<DocumentContent> {
        Ok(self.0.before.clone())
    }

    fn display_name(&self) -> &'static str {
        "Clear Formatting"
    }
}
