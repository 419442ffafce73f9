//! Event types for the import event system
//!
//! Provides the shared `ImportEvent` definitions and the `EventBus` used to
//! broadcast orchestrator progress to SSE clients and operational logging.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Import event types
///
/// Events are broadcast via the EventBus and can be serialized for SSE
/// transmission. All orchestrator-visible events use this central enum for
/// type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEvent {
    /// An import run was triggered (scheduled or manual)
    RunStarted {
        trigger: RunTrigger,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A unit of work reached a terminal state
    StageCompleted {
        /// Stage identifier (e.g. "import-licence")
        stage: String,
        /// Unit identifier within the stage
        unit_id: Uuid,
        /// Whether the unit completed or terminally failed
        succeeded: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A unit exhausted its retry budget or hit a data-integrity error.
    /// Surfaced for operator attention; never silently dropped.
    UnitFailed {
        stage: String,
        unit_id: Uuid,
        /// Enough context (legacy region+id) to re-run after a source fix
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All units of a full import run reached a terminal state
    RunCompleted {
        /// Units that completed successfully
        completed: usize,
        /// Units that terminally failed
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ImportEvent {
    /// Event type name for SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ImportEvent::RunStarted { .. } => "RunStarted",
            ImportEvent::StageCompleted { .. } => "StageCompleted",
            ImportEvent::UnitFailed { .. } => "UnitFailed",
            ImportEvent::RunCompleted { .. } => "RunCompleted",
        }
    }
}

/// What triggered an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    Scheduled,
    Manual,
}

/// Broadcast bus for import events
///
/// Wraps a `tokio::sync::broadcast` channel. Subscribers that fall behind
/// lose the oldest events rather than blocking the orchestrator.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ImportEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscribers case.
    ///
    /// The orchestrator must keep running whether or not anything is
    /// listening on the bus.
    pub fn emit_lossy(&self, event: ImportEvent) {
        let _ = self.tx.send(event);
    }
}
