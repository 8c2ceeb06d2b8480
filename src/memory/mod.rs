//! Conversational memory: an ordered message log led by one system message.
//!
//! A `Memory` is owned by one agent, or shared by reference as council
//! minutes. It is not internally synchronized; callers serialize access.

mod handoff;
mod window;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{Message, Role};

pub use handoff::{build_handoff_system_message, HandoffOptions};
pub use window::{slide_window_compression, TRUNCATION_MARKER};

/// Default retained message count for a bare `Memory`.
pub const DEFAULT_MAX_HISTORY: usize = 60;

/// Caller-supplied compression strategy used by [`Memory::arrange`].
pub type CompressFn = Arc<dyn Fn(&[Message]) -> Vec<Message> + Send + Sync>;

/// Listener invoked on structural change.
pub type ChangeListener = Arc<dyn Fn(&MemoryChange) + Send + Sync>;

/// Which operation changed the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryChangeKind {
    Added,
    SystemReplaced,
    Reset,
    Handoff,
    Arranged,
    Replaced,
}

/// Structural change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryChange {
    pub kind: MemoryChangeKind,
    /// Message count before the change.
    pub before: usize,
    /// Message count after the change.
    pub after: usize,
}

#[derive(Clone)]
pub struct Memory {
    name: String,
    instructions: String,
    messages: Vec<Message>,
    max_history: usize,
    listeners: Vec<ChangeListener>,
}

impl Memory {
    /// Create a memory whose only entry is `system_message`.
    pub fn new(name: impl Into<String>, system_message: impl Into<String>) -> Self {
        let instructions = system_message.into();
        Self {
            name: name.into(),
            messages: vec![Message::system(instructions.clone())],
            instructions,
            max_history: DEFAULT_MAX_HISTORY,
            listeners: Vec::new(),
        }
    }

    /// Set the retained message bound. `0` disables compression; values
    /// below 3 are raised to 3.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.set_max_history(max_history);
        self
    }

    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = match max_history {
            0 => 0,
            n => n.max(3),
        };
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The system message this memory was created with.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the current system message, or `""` when there is none.
    pub fn system_message(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.is_system())
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Register a structural-change listener.
    pub fn on_change(&mut self, listener: impl Fn(&MemoryChange) + Send + Sync + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    /// Append messages in order.
    pub fn add(&mut self, messages: impl IntoIterator<Item = Message>) {
        let before = self.len();
        self.messages.extend(messages);
        if self.len() != before {
            self.notify(MemoryChangeKind::Added, before);
        }
    }

    /// Append raw JSON messages.
    ///
    /// All entries are appended only when every entry carries a `role` and
    /// deserializes into a [`Message`]; otherwise nothing is appended.
    /// Returns the number of messages appended.
    pub fn add_json(&mut self, raw: &[serde_json::Value]) -> usize {
        if !raw.iter().all(|m| m.get("role").is_some_and(|r| !r.is_null())) {
            return 0;
        }
        let parsed: std::result::Result<Vec<Message>, _> = raw
            .iter()
            .map(|m| serde_json::from_value::<Message>(m.clone()))
            .collect();
        match parsed {
            Ok(messages) => {
                let count = messages.len();
                self.add(messages);
                count
            }
            Err(e) => {
                debug!(memory = %self.name, error = %e, "Ignoring malformed messages");
                0
            }
        }
    }

    /// Replace the leading system message, or prepend one if the log does
    /// not start with a system message.
    pub fn replace_system_message(&mut self, text: impl Into<String>) {
        let before = self.len();
        let system = Message::system(text);
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => *first = system,
            _ => self.messages.insert(0, system),
        }
        self.notify(MemoryChangeKind::SystemReplaced, before);
    }

    /// Clear every message, system message included.
    pub fn reset(&mut self) {
        let before = self.len();
        self.messages.clear();
        self.notify(MemoryChangeKind::Reset, before);
    }

    /// Replace the whole log.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        let before = self.len();
        self.messages = messages;
        self.notify(MemoryChangeKind::Replaced, before);
    }

    /// Swap the trailing plain assistant reply for `message`, or append
    /// `message` when the log does not end with one.
    pub fn replace_last_reply(&mut self, message: Message) {
        let before = self.len();
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant && !last.has_tool_calls() => {
                *last = message;
                self.notify(MemoryChangeKind::Replaced, before);
            }
            _ => self.add([message]),
        }
    }

    /// Take over from another agent's memory.
    ///
    /// The system message becomes a synthesized handoff message. With
    /// `inherit`, `from`'s non-system history is placed ahead of our own.
    pub fn handoff(&mut self, from: &Memory, options: HandoffOptions) {
        let before = self.len();
        let system = Message::system(build_handoff_system_message(
            from,
            self,
            &options.context,
        ));

        let own = self.messages.iter().filter(|m| !m.is_system()).cloned();
        let mut messages = vec![system];
        if options.inherit {
            messages.extend(from.messages.iter().filter(|m| !m.is_system()).cloned());
        }
        messages.extend(own);
        self.messages = messages;
        self.notify(MemoryChangeKind::Handoff, before);
    }

    /// Enforce the history bound.
    ///
    /// Leaves the log untouched when it fits. Otherwise applies `compress`
    /// or the default sliding window. Returns the number of messages
    /// removed.
    pub fn arrange(&mut self, compress: Option<&CompressFn>) -> usize {
        let before = self.len();
        if self.max_history == 0 || before <= self.max_history {
            return 0;
        }

        let compressed = match compress {
            Some(compress) => compress(&self.messages),
            None => slide_window_compression(&self.messages, self.window_size()),
        };
        self.messages = compressed;

        if self.len() != before {
            self.notify(MemoryChangeKind::Arranged, before);
        }
        before.saturating_sub(self.len())
    }

    /// Pretty-printed JSON of the log.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.messages)?)
    }

    fn window_size(&self) -> usize {
        let reserved = usize::from(self.messages.iter().any(Message::is_system));
        self.max_history.saturating_sub(reserved).max(2)
    }

    fn notify(&self, kind: MemoryChangeKind, before: usize) {
        if self.listeners.is_empty() {
            return;
        }
        let change = MemoryChange {
            kind,
            before,
            after: self.len(),
        };
        for listener in &self.listeners {
            listener(&change);
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("name", &self.name)
            .field("messages", &self.messages.len())
            .field("max_history", &self.max_history)
            .finish()
    }
}
