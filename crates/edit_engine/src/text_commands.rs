//! Text commands: insertion, deletion, and replacement
//!
//! Text payloads are styled fragments rather than bare strings, so whatever
//! formatting or embedded objects a deletion removes come back on undo.

use crate::command::{check_position, check_range_len, expect_fragment, run_end};
use crate::{ContentEdit, Result};
use doc_model::{DocumentContent, TextRange};

/// Insert a fragment at a position
#[derive(Debug, Clone, PartialEq)]
pub struct InsertText {
    pub position: usize,
    pub inserted: DocumentContent,
}

impl InsertText {
    /// Insert a styled fragment
    pub fn new(position: usize, inserted: DocumentContent) -> Self {
        Self { position, inserted }
    }

    /// Insert unstyled text
    pub fn plain(position: usize, text: impl Into<String>) -> Self {
        Self::new(position, DocumentContent::plain(text))
    }

    /// Insert text carrying the attributes of the character before the
    /// caret, the way typing continues the surrounding style
    pub fn with_typing_attributes(content: &DocumentContent, position: usize, text: &str) -> Self {
        let attributes = content.attributes_at(position.saturating_sub(1));
        Self::new(position, DocumentContent::styled(text, attributes))
    }

    pub fn inserted_len(&self) -> usize {
        self.inserted.len()
    }
}

impl ContentEdit for InsertText {
    fn apply(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        check_position(self.position, &content)?;
        content.insert(self.position, &self.inserted)?;
        Ok(content)
    }

    fn revert(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        expect_fragment(&content, self.position, &self.inserted)?;
        let end = run_end(self.position, self.inserted.len(), &content)?;
        content.remove(self.position..end)?;
        Ok(content)
    }

    fn display_name(&self) -> &'static str {
        "Insert Text"
    }
}

/// Delete a range, remembering what was there
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteText {
    pub start: usize,
    pub end: usize,
    pub deleted: DocumentContent,
}

impl DeleteText {
    /// Capture the range about to be deleted from the current content
    pub fn capture(content: &DocumentContent, range: impl Into<TextRange>) -> Result<Self> {
        let range = range.into();
        let deleted = content.slice(range)?;
        Ok(Self {
            start: range.start,
            end: range.end,
            deleted,
        })
    }
}

impl ContentEdit for DeleteText {
    fn apply(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        check_range_len(self.start, self.end, &self.deleted)?;
        expect_fragment(&content, self.start, &self.deleted)?;
        content.remove(self.start..self.end)?;
        Ok(content)
    }

    fn revert(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        check_position(self.start, &content)?;
        content.insert(self.start, &self.deleted)?;
        Ok(content)
    }

    fn display_name(&self) -> &'static str {
        "Delete"
    }
}

/// Replace a range with a new fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceText {
    pub start: usize,
    pub end: usize,
    pub old: DocumentContent,
    pub new: DocumentContent,
}

impl ReplaceText {
    /// Capture the range about to be replaced from the current content
    pub fn capture(
        content: &DocumentContent,
        range: impl Into<TextRange>,
        replacement: DocumentContent,
    ) -> Result<Self> {
        let range = range.into();
        let old = content.slice(range)?;
        Ok(Self {
            start: range.start,
            end: range.end,
            old,
            new: replacement,
        })
    }
}

impl ContentEdit for ReplaceText {
    fn apply(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        check_range_len(self.start, self.end, &self.old)?;
        expect_fragment(&content, self.start, &self.old)?;
        content.splice(self.start..self.end, &self.new)?;
        Ok(content)
    }

    fn revert(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        expect_fragment(&content, self.start, &self.new)?;
        let end = run_end(self.start, self.new.len(), &content)?;
        content.splice(self.start..end, &self.old)?;
        Ok(content)
    }

    fn display_name(&self) -> &'static str {
        "Replace"
    }
}
