//! Capturing and restoring a command stack
//!
//! Restoring is per record: a record that cannot be read is skipped and
//! reported, and every other record still loads in its original order.

use crate::{CommandRecord, CommandSerializer, PersistedHistory, Result, StoreError};
use doc_model::{ContentCodec, FileId};
use edit_engine::{Command, CommandStack, StackConfig};
use uuid::Uuid;

/// Which side of the stack a record belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySide {
    Undo,
    Redo,
}

/// A record that was skipped while restoring
#[derive(Debug)]
pub struct RecordFailure {
    pub side: HistorySide,
    /// Position of the record within its side, oldest first
    pub index: usize,
    pub id: Uuid,
    pub kind: String,
    pub error: StoreError,
}

/// The result of restoring persisted history
pub struct LoadedHistory {
    pub stack: CommandStack,
    pub failures: Vec<RecordFailure>,
}

impl LoadedHistory {
    /// Whether every record loaded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Serialize both sides of a stack
pub fn capture<C: ContentCodec>(stack: &CommandStack, serializer: &CommandSerializer<C>) -> Result<PersistedHistory> {
    let undo = serialize_all(stack.undo_commands(), serializer)?;
    let redo = serialize_all(stack.redo_commands(), serializer)?;
    Ok(PersistedHistory::new(undo, redo))
}

/// Rebuild a stack for `target` from persisted history
pub fn restore<C: ContentCodec>(
    history: &PersistedHistory,
    target: FileId,
    config: StackConfig,
    serializer: &CommandSerializer<C>,
) -> Result<LoadedHistory> {
    if !history.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "unsupported history header '{}' v{}",
            history.header.magic, history.header.version
        )));
    }

    let mut failures = Vec::new();
    let undo = deserialize_side(&history.undo, HistorySide::Undo, target, serializer, &mut failures);
    let redo = deserialize_side(&history.redo, HistorySide::Redo, target, serializer, &mut failures);

    if !failures.is_empty() {
        tracing::warn!(
            "Restored history with {} of {} records skipped",
            failures.len(),
            history.len()
        );
    }

    Ok(LoadedHistory {
        stack: CommandStack::from_history(undo, redo, config),
        failures,
    })
}

fn serialize_all<C: ContentCodec>(commands: &[Command], serializer: &CommandSerializer<C>) -> Result<Vec<CommandRecord>> {
    commands.iter().map(|command| serializer.serialize(command)).collect()
}

fn deserialize_side<C: ContentCodec>(
    records: &[CommandRecord],
    side: HistorySide,
    target: FileId,
    serializer: &CommandSerializer<C>,
    failures: &mut Vec<RecordFailure>,
) -> Vec<Command> {
    let mut commands = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match serializer.deserialize(record, target) {
            Ok(command) => commands.push(command),
            Err(error) => {
                tracing::warn!(
                    "Skipping {:?} record {} ({} '{}'): {}",
                    side,
                    index,
                    record.kind,
                    record.label,
                    error
                );
                failures.push(RecordFailure {
                    side,
                    index,
                    id: record.id,
                    kind: record.kind.clone(),
                    error,
                });
            }
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{AttributeSet, DocumentContent, DocumentRegistry, VersionStore};
    use edit_engine::{ApplyFormat, InsertText};

    fn edited_stack() -> (DocumentRegistry, FileId, CommandStack) {
        let mut registry = DocumentRegistry::new();
        let file = registry.open("Notes", DocumentContent::plain("Hello")).unwrap();
        let mut stack = CommandStack::new();

        stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(5, " World")));
        let content = registry.current_content(file).unwrap();
        let bold = ApplyFormat::over_range(&content, 0..5, &AttributeSet::bold()).unwrap();
        stack.execute(&mut registry, Command::new(file, "Bold", bold));
        stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(11, "!")));
        stack.undo(&mut registry);

        (registry, file, stack)
    }

    #[test]
    fn test_capture_keeps_order_and_sides() {
        let (_, _, stack) = edited_stack();
        let history = capture(&stack, &CommandSerializer::new()).unwrap();

        assert_eq!(history.undo.len(), 2);
        assert_eq!(history.redo.len(), 1);
        assert_eq!(history.undo[0].kind, "insertText");
        assert_eq!(history.undo[1].kind, "applyFormat");
        assert_eq!(history.redo[0].label, "Typing");
    }

    #[test]
    fn test_restore_continues_undo_and_redo() {
        let (mut registry, file, stack) = edited_stack();
        let serializer = CommandSerializer::new();
        let history = capture(&stack, &serializer).unwrap();
        drop(stack);

        let loaded = restore(&history, file, StackConfig::default(), &serializer).unwrap();
        assert!(loaded.is_complete());
        let mut stack = loaded.stack;

        assert!(stack.redo(&mut registry));
        assert_eq!(registry.current_content(file).unwrap().text(), "Hello World!");

        while stack.undo(&mut registry) {}
        assert_eq!(registry.current_content(file).unwrap(), DocumentContent::plain("Hello"));
        assert!(stack.take_diagnostics().is_empty());
    }

    #[test]
    fn test_restore_skips_bad_records() {
        let (_, file, stack) = edited_stack();
        let serializer = CommandSerializer::new();
        let mut history = capture(&stack, &serializer).unwrap();
        history.undo[0].kind = "drawShape".to_string();
        history.redo[0].payload = serde_json::json!({});

        let loaded = restore(&history, file, StackConfig::default(), &serializer).unwrap();

        assert_eq!(loaded.stack.undo_commands().len(), 1);
        assert_eq!(loaded.stack.undo_label(), Some("Bold"));
        assert!(!loaded.stack.can_redo());

        assert_eq!(loaded.failures.len(), 2);
        assert_eq!(loaded.failures[0].side, HistorySide::Undo);
        assert_eq!(loaded.failures[0].index, 0);
        assert!(matches!(loaded.failures[0].error, StoreError::UnsupportedVariant { .. }));
        assert_eq!(loaded.failures[1].side, HistorySide::Redo);
        assert!(matches!(loaded.failures[1].error, StoreError::SerializationCorrupt(_)));
    }

    #[test]
    fn test_restore_rejects_foreign_header() {
        let mut history = PersistedHistory::default();
        history.header.magic = "SOMETHING-ELSE".to_string();

        let result = restore(&history, FileId::new(), StackConfig::default(), &CommandSerializer::new());
        assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
    }

    #[test]
    fn test_restore_applies_stack_limit() {
        let (_, file, stack) = edited_stack();
        let serializer = CommandSerializer::new();
        let history = capture(&stack, &serializer).unwrap();

        let loaded = restore(&history, file, StackConfig::default().with_max_entries(1), &serializer).unwrap();
        assert_eq!(loaded.stack.undo_commands().len(), 1);
        assert_eq!(loaded.stack.undo_label(), Some("Bold"));
    }
}
