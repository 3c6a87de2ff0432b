//! Command system for document editing
//!
//! A [`Command`] is one reversible, timestamped edit against a target file.
//! The concrete edits form the closed [`CommandKind`] sum type; each variant
//! carries everything needed to apply and reverse itself without looking at
//! anything but the content it is handed.

use crate::{
    ApplyFormat, DeleteText, EditError, InsertEmbeddedObject, InsertText, RemoveFormat,
    ReplaceText, Result, UpdateEmbeddedObject,
};
use chrono::{DateTime, Utc};
use doc_model::{DocumentContent, FileId, VersionStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reversible transformation of styled content
pub trait ContentEdit {
    /// Produce the content after this edit
    fn apply(&self, content: DocumentContent) -> Result<DocumentContent>;

    /// Produce the content before this edit
    fn revert(&self, content: DocumentContent) -> Result<DocumentContent>;

    /// Get a display name for this edit
    fn display_name(&self) -> &'static str;
}

/// Wire tag of each command variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandTag {
    InsertText,
    DeleteText,
    ReplaceText,
    ApplyFormat,
    RemoveFormat,
    InsertObject,
    UpdateObject,
}

impl CommandTag {
    pub const ALL: [CommandTag; 7] = [
        CommandTag::InsertText,
        CommandTag::DeleteText,
        CommandTag::ReplaceText,
        CommandTag::ApplyFormat,
        CommandTag::RemoveFormat,
        CommandTag::InsertObject,
        CommandTag::UpdateObject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandTag::InsertText => "insertText",
            CommandTag::DeleteText => "deleteText",
            CommandTag::ReplaceText => "replaceText",
            CommandTag::ApplyFormat => "applyFormat",
            CommandTag::RemoveFormat => "removeFormat",
            CommandTag::InsertObject => "insertObject",
            CommandTag::UpdateObject => "updateObject",
        }
    }

    /// Look up a tag by its wire name
    pub fn parse(tag: &str) -> Option<CommandTag> {
        CommandTag::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }
}

impl std::fmt::Display for CommandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The concrete edit a command performs
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    InsertText(InsertText),
    DeleteText(DeleteText),
    ReplaceText(ReplaceText),
    ApplyFormat(ApplyFormat),
    RemoveFormat(RemoveFormat),
    InsertObject(InsertEmbeddedObject),
    UpdateObject(UpdateEmbeddedObject),
}

impl CommandKind {
    pub fn tag(&self) -> CommandTag {
        match self {
            CommandKind::InsertText(_) => CommandTag::InsertText,
            CommandKind::DeleteText(_) => CommandTag::DeleteText,
            CommandKind::ReplaceText(_) => CommandTag::ReplaceText,
            CommandKind::ApplyFormat(_) => CommandTag::ApplyFormat,
            CommandKind::RemoveFormat(_) => CommandTag::RemoveFormat,
            CommandKind::InsertObject(_) => CommandTag::InsertObject,
            CommandKind::UpdateObject(_) => CommandTag::UpdateObject,
        }
    }

    fn edit(&self) -> &dyn ContentEdit {
        match self {
            CommandKind::InsertText(edit) => edit,
            CommandKind::DeleteText(edit) => edit,
            CommandKind::ReplaceText(edit) => edit,
            CommandKind::ApplyFormat(edit) => edit,
            CommandKind::RemoveFormat(edit) => edit,
            CommandKind::InsertObject(edit) => edit,
            CommandKind::UpdateObject(edit) => edit,
        }
    }
}

macro_rules! impl_from_edit {
    ($($variant:ident($edit:ty)),* $(,)?) => {
        $(
            impl From<$edit> for CommandKind {
                fn from(edit: $edit) -> Self {
                    CommandKind::$variant(edit)
                }
            }
        )*
    };
}

impl_from_edit!(
    InsertText(InsertText),
    DeleteText(DeleteText),
    ReplaceText(ReplaceText),
    ApplyFormat(ApplyFormat),
    RemoveFormat(RemoveFormat),
    InsertObject(InsertEmbeddedObject),
    UpdateObject(UpdateEmbeddedObject),
);

/// A named, timestamped, reversible edit against one file
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    id: Uuid,
    timestamp: DateTime<Utc>,
    label: String,
    /// Non-owning handle to the target file
    target: FileId,
    kind: CommandKind,
}

impl Command {
    /// Create a command stamped with a fresh ID and the current time.
    /// The label defaults to the edit's display name when empty.
    pub fn new(target: FileId, label: impl Into<String>, kind: impl Into<CommandKind>) -> Self {
        let kind = kind.into();
        let mut label = label.into();
        if label.is_empty() {
            label = kind.edit().display_name().to_string();
        }
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            label,
            target,
            kind,
        }
    }

    /// Reassemble a command from persisted parts
    pub fn from_parts(
        id: Uuid,
        timestamp: DateTime<Utc>,
        label: impl Into<String>,
        target: FileId,
        kind: CommandKind,
    ) -> Self {
        Self {
            id,
            timestamp,
            label: label.into(),
            target,
            kind,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Human-readable label, e.g. for an "Undo Typing" menu item
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> FileId {
        self.target
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn tag(&self) -> CommandTag {
        self.kind.tag()
    }

    /// Apply the after state to the target file
    pub fn execute(&self, store: &mut dyn VersionStore) -> Result<DocumentContent> {
        self.transition(store, |edit, content| edit.apply(content))
    }

    /// Apply the before state to the target file
    pub fn undo(&self, store: &mut dyn VersionStore) -> Result<DocumentContent> {
        self.transition(store, |edit, content| edit.revert(content))
    }

    fn transition<F>(&self, store: &mut dyn VersionStore, step: F) -> Result<DocumentContent>
    where
        F: FnOnce(&dyn ContentEdit, DocumentContent) -> Result<DocumentContent>,
    {
        let current = store.current_content(self.target)?;
        let next = step(self.kind.edit(), current)?;
        store.set_current_content(self.target, next.clone())?;
        store.touch_modified(self.target)?;
        Ok(next)
    }
}

/// Fail with [`EditError::OutOfRangePosition`] unless `position <= len`
pub(crate) fn check_position(position: usize, content: &DocumentContent) -> Result<()> {
    let len = content.len();
    if position > len {
        return Err(EditError::OutOfRangePosition { position, len });
    }
    Ok(())
}

/// The end of a `len`-codepoint run starting at `start`, provided it lies
/// inside `content`
pub(crate) fn run_end(start: usize, len: usize, content: &DocumentContent) -> Result<usize> {
    let end = start.checked_add(len).ok_or(EditError::OutOfRangePosition {
        position: start,
        len: content.len(),
    })?;
    check_position(end, content)?;
    Ok(end)
}

/// Fail with [`EditError::Inconsistent`] unless `start..end` spans exactly
/// the codepoints of `fragment`
pub(crate) fn check_range_len(start: usize, end: usize, fragment: &DocumentContent) -> Result<()> {
    if end.checked_sub(start) != Some(fragment.len()) {
        return Err(EditError::Inconsistent(format!(
            "range {}..{} does not match a fragment of {} codepoints",
            start,
            end,
            fragment.len()
        )));
    }
    Ok(())
}

/// Fail with [`EditError::Inconsistent`] unless the content at `start`
/// equals `expected`
pub(crate) fn expect_fragment(content: &DocumentContent, start: usize, expected: &DocumentContent) -> Result<()> {
    let end = run_end(start, expected.len(), content)?;
    let actual = content.slice(start..end)?;
    if &actual != expected {
        return Err(EditError::Inconsistent(format!(
            "expected {:?} at {}..{}, found {:?}",
            expected.text(),
            start,
            end,
            actual.text()
        )));
    }
    Ok(())
}
