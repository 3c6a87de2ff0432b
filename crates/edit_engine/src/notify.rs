//! Change notifications delivered to observers of a command stack

use doc_model::{DocumentContent, FileId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which stack operation produced a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Execute,
    Undo,
    Redo,
    /// A change made inside a programmatic mutation scope
    Programmatic,
}

/// Sent after an operation changed visible content
#[derive(Debug, Clone)]
pub struct ContentRestored {
    pub file: FileId,
    pub content: DocumentContent,
    pub phase: Phase,
    /// The command responsible, if the change came from one
    pub command_id: Option<Uuid>,
}

/// Handle returned by [`crate::CommandStack::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ContentRestored) + Send>;

/// Observers registered on one stack
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub(crate) fn notify(&mut self, event: &ContentRestored) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}
