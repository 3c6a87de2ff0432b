//! Undo/redo command stack
//!
//! The stack owns the command history of one document. Failures while
//! applying a command never reach the caller: the command still moves between
//! stacks so the history keeps matching the user's actions, and the failure is
//! logged and kept as a [`Diagnostic`].

use crate::notify::Observers;
use crate::{Command, ContentRestored, EditError, Phase, SubscriptionId};
use doc_model::{DocumentContent, FileId, VersionStore};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use uuid::Uuid;

/// Configuration for a command stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Maximum number of undo entries; the oldest are evicted beyond it
    #[serde(default)]
    pub max_entries: Option<usize>,
    /// Panic in debug builds when a command is applied against a buffer its
    /// positions do not fit
    #[serde(default)]
    pub assert_positions: bool,
}

impl StackConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

/// Whether edits are currently being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackState {
    Clean,
    ProgrammaticMutation,
}

/// A recoverable failure absorbed by the stack
#[derive(Debug)]
pub struct Diagnostic {
    pub command_id: Option<Uuid>,
    pub label: String,
    pub phase: Phase,
    pub error: EditError,
}

/// Diagnostics kept before the oldest are dropped
pub const MAX_DIAGNOSTICS: usize = 256;

/// Manages the undo and redo stacks of one document
pub struct CommandStack {
    /// Commands that can be undone, oldest first
    undo_stack: Vec<Command>,
    /// Commands that can be redone, oldest first
    redo_stack: Vec<Command>,
    config: StackConfig,
    state: StackState,
    observers: Observers,
    /// Most recent failures, capped at [`MAX_DIAGNOSTICS`]
    diagnostics: VecDeque<Diagnostic>,
}

impl CommandStack {
    /// Create an empty stack with default configuration
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    pub fn with_config(config: StackConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            config,
            state: StackState::Clean,
            observers: Observers::default(),
            diagnostics: VecDeque::new(),
        }
    }

    /// Rebuild a stack from persisted history. Both vectors are ordered
    /// oldest first, so the last element is the next to undo/redo.
    pub fn from_history(undo: Vec<Command>, redo: Vec<Command>, config: StackConfig) -> Self {
        let mut stack = Self::with_config(config);
        stack.undo_stack = undo;
        stack.redo_stack = redo;
        stack.enforce_limit();
        stack
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn state(&self) -> StackState {
        self.state
    }

    /// Apply a command and record it for undo.
    ///
    /// Recording clears the redo stack. Inside a programmatic mutation scope
    /// the command is applied but not recorded. Returns whether the command
    /// applied cleanly; a failed command is still recorded.
    pub fn execute(&mut self, store: &mut dyn VersionStore, command: Command) -> bool {
        if self.state == StackState::ProgrammaticMutation {
            return self.run(store, &command, Phase::Programmatic);
        }

        if self.contains(command.id()) {
            tracing::warn!("Command {} ({}) was already executed", command.id(), command.label());
            return false;
        }

        let applied = self.run(store, &command, Phase::Execute);

        self.redo_stack.clear();
        self.undo_stack.push(command);
        self.enforce_limit();
        applied
    }

    /// Undo the most recent command. Returns false if there was nothing to undo.
    pub fn undo(&mut self, store: &mut dyn VersionStore) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        self.run(store, &command, Phase::Undo);
        self.redo_stack.push(command);
        true
    }

    /// Redo the most recently undone command. Returns false if there was nothing to redo.
    pub fn redo(&mut self, store: &mut dyn VersionStore) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        self.run(store, &command, Phase::Redo);
        self.undo_stack.push(command);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the command `undo` would reverse
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(Command::label)
    }

    /// Label of the command `redo` would reapply
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(Command::label)
    }

    /// Undoable commands, oldest first
    pub fn undo_commands(&self) -> &[Command] {
        &self.undo_stack
    }

    /// Redoable commands, oldest first
    pub fn redo_commands(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Register a callback invoked after every content change
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ContentRestored) + Send + 'static,
    {
        self.observers.subscribe(Box::new(callback))
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Drain the recoverable failures recorded so far. Only the most recent
    /// [`MAX_DIAGNOSTICS`] are kept between drains.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain(..).collect()
    }

    /// Enter a programmatic mutation scope. Commands executed through the
    /// returned guard are applied without touching either stack; the scope
    /// ends when the guard is dropped, however that happens.
    pub fn programmatic_mutation(&mut self) -> ProgrammaticMutation<'_> {
        let previous = self.state;
        self.state = StackState::ProgrammaticMutation;
        tracing::trace!("Entering programmatic mutation");
        ProgrammaticMutation {
            stack: self,
            previous,
        }
    }

    /// Run `scope` inside a programmatic mutation scope
    pub fn with_programmatic_mutation<R, F>(&mut self, scope: F) -> R
    where
        F: FnOnce(&mut ProgrammaticMutation<'_>) -> R,
    {
        let mut guard = self.programmatic_mutation();
        scope(&mut guard)
    }

    fn contains(&self, id: Uuid) -> bool {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .any(|command| command.id() == id)
    }

    fn enforce_limit(&mut self) {
        if let Some(max) = self.config.max_entries {
            if self.undo_stack.len() > max {
                let excess = self.undo_stack.len() - max;
                self.undo_stack.drain(..excess);
                tracing::debug!("Evicted {} oldest undo entries", excess);
            }
        }
    }

    fn run(&mut self, store: &mut dyn VersionStore, command: &Command, phase: Phase) -> bool {
        let result = match phase {
            Phase::Undo => command.undo(store),
            _ => command.execute(store),
        };

        match result {
            Ok(content) => {
                self.notify(command.target(), content, phase, Some(command.id()));
                true
            }
            Err(error) => {
                self.report(Some(command.id()), command.label(), phase, error);
                false
            }
        }
    }

    fn notify(&mut self, file: FileId, content: DocumentContent, phase: Phase, command_id: Option<Uuid>) {
        self.observers.notify(&ContentRestored {
            file,
            content,
            phase,
            command_id,
        });
    }

    fn report(&mut self, command_id: Option<Uuid>, label: &str, phase: Phase, error: EditError) {
        match &error {
            EditError::StaleTarget(file) => {
                tracing::warn!("Skipping {:?} of '{}': file {} is gone", phase, label, file);
            }
            EditError::OutOfRangePosition { .. } => {
                tracing::warn!("Skipping {:?} of '{}': {}", phase, label, error);
                if self.config.assert_positions {
                    debug_assert!(false, "command applied against the wrong document state: {}", error);
                }
            }
            _ => {
                tracing::warn!("Skipping {:?} of '{}': {}", phase, label, error);
            }
        }

        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(Diagnostic {
            command_id,
            label: label.to_string(),
            phase,
            error,
        });
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a programmatic mutation scope
pub struct ProgrammaticMutation<'a> {
    stack: &'a mut CommandStack,
    previous: StackState,
}

impl ProgrammaticMutation<'_> {
    /// Edit a file's content directly, without creating a command
    pub fn edit<F>(&mut self, store: &mut dyn VersionStore, file: FileId, edit: F) -> bool
    where
        F: FnOnce(&mut DocumentContent) -> doc_model::Result<()>,
    {
        let result = store.current_content(file).and_then(|mut content| {
            edit(&mut content)?;
            store.set_current_content(file, content.clone())?;
            store.touch_modified(file)?;
            Ok(content)
        });

        match result {
            Ok(content) => {
                self.stack.notify(file, content, Phase::Programmatic, None);
                true
            }
            Err(error) => {
                self.stack
                    .report(None, "Programmatic edit", Phase::Programmatic, error.into());
                false
            }
        }
    }
}

impl Deref for ProgrammaticMutation<'_> {
    type Target = CommandStack;

    fn deref(&self) -> &CommandStack {
        self.stack
    }
}

impl DerefMut for ProgrammaticMutation<'_> {
    fn deref_mut(&mut self) -> &mut CommandStack {
        self.stack
    }
}

impl Drop for ProgrammaticMutation<'_> {
    fn drop(&mut self) {
        self.stack.state = self.previous;
        tracing::trace!("Leaving programmatic mutation");
    }
}
