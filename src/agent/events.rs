//! Lifecycle events and the listener registry.
//!
//! Events are advisory: listeners observe a run but cannot alter it.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumString};
use tokio::sync::mpsc;

use super::stats::ExecutionStats;
use crate::types::{AgentOutput, Usage};

/// Events emitted by an agent run.
#[derive(Debug, Clone, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(name(AgentEventKind))]
#[strum_discriminants(derive(Hash, Display, EnumString, Serialize, Deserialize))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
#[strum_discriminants(serde(rename_all = "snake_case"))]
pub enum AgentEvent {
    Start {
        agent: String,
        input: serde_json::Value,
        context: serde_json::Value,
    },
    Log {
        agent: String,
        message: String,
    },
    Warn {
        agent: String,
        message: String,
    },
    Error {
        agent: String,
        message: String,
        stats: Option<ExecutionStats>,
    },
    ToolCallStart {
        name: String,
        arguments: String,
    },
    ToolCallEnd {
        name: String,
        result: serde_json::Value,
    },
    ToolCallError {
        name: String,
        error: String,
    },
    LlmCallStart {
        step: usize,
        message_count: usize,
    },
    LlmCallEnd {
        step: usize,
        usage: Usage,
    },
    MessageCompressed {
        original_count: usize,
        compressed_count: usize,
    },
    StatsUpdate {
        step: usize,
        stats: ExecutionStats,
    },
    Completed {
        output: AgentOutput,
        stats: ExecutionStats,
    },
    Aborted {
        stats: ExecutionStats,
    },
}

impl AgentEvent {
    pub fn kind(&self) -> AgentEventKind {
        AgentEventKind::from(self)
    }
}

/// Handle returned by [`AgentEvents::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&AgentEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Option<AgentEventKind>, Listener)>,
    channels: Vec<mpsc::UnboundedSender<AgentEvent>>,
}

/// Listener registry shared by an agent and the components it drives.
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct AgentEvents {
    inner: Arc<RwLock<Registry>>,
}

impl AgentEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind.
    pub fn on(
        &self,
        kind: AgentEventKind,
        listener: impl Fn(&AgentEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Register a listener for every event.
    pub fn on_any(&self, listener: impl Fn(&AgentEvent) + Send + Sync + 'static) -> ListenerId {
        self.register(None, Arc::new(listener))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = registry.listeners.len();
        registry.listeners.retain(|(existing, _, _)| *existing != id);
        registry.listeners.len() != before
    }

    /// Receive every subsequent event on a channel the caller drains.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AgentEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .channels
            .push(tx);
        rx
    }

    /// Deliver an event to listeners and subscribers.
    ///
    /// `log`, `warn` and `error` events are mirrored to `tracing`.
    pub fn emit(&self, event: AgentEvent) {
        mirror_to_tracing(&event);

        let kind = event.kind();
        let (listeners, has_closed_channel) = {
            let registry = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            let listeners: Vec<Listener> = registry
                .listeners
                .iter()
                .filter(|(_, filter, _)| filter.map_or(true, |k| k == kind))
                .map(|(_, _, listener)| listener.clone())
                .collect();
            let mut closed = false;
            for tx in &registry.channels {
                if tx.send(event.clone()).is_err() {
                    closed = true;
                }
            }
            (listeners, closed)
        };

        if has_closed_channel {
            self.inner
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .channels
                .retain(|tx| !tx.is_closed());
        }

        for listener in listeners {
            listener(&event);
        }
    }

    pub(crate) fn log(&self, agent: &str, message: impl Into<String>) {
        self.emit(AgentEvent::Log {
            agent: agent.to_string(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&self, agent: &str, message: impl Into<String>) {
        self.emit(AgentEvent::Warn {
            agent: agent.to_string(),
            message: message.into(),
        });
    }

    pub(crate) fn error(&self, agent: &str, message: impl Into<String>) {
        self.emit(AgentEvent::Error {
            agent: agent.to_string(),
            message: message.into(),
            stats: None,
        });
    }

    fn register(&self, kind: Option<AgentEventKind>, listener: Listener) -> ListenerId {
        let mut registry = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry.listeners.push((id, kind, listener));
        id
    }
}

impl std::fmt::Debug for AgentEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AgentEvents")
            .field("listeners", &registry.listeners.len())
            .field("channels", &registry.channels.len())
            .finish()
    }
}

fn mirror_to_tracing(event: &AgentEvent) {
    match event {
        AgentEvent::Log { agent, message } => tracing::info!(agent = %agent, "{message}"),
        AgentEvent::Warn { agent, message } => tracing::warn!(agent = %agent, "{message}"),
        AgentEvent::Error { agent, message, .. } => {
            tracing::error!(agent = %agent, "{message}")
        }
        _ => {}
    }
}
