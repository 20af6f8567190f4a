//! Conversation state shared between the agent and its observers
//!
//! One research turn owns a single [`AgentState`]. Nodes describe their
//! changes as [`StateDelta`] patches, and intermediate snapshots are
//! published through a [`StateSink`] so a host can render progress while a
//! remote call is still in flight.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::trace;
use uuid::Uuid;

use ebisu_apollo::PersonRecord;
use ebisu_provider::Message;

/// Severity tag for a progress log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Progress,
    Success,
    Error,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Info => "info",
            LogKind::Progress => "progress",
            LogKind::Success => "success",
            LogKind::Error => "error",
        }
    }
}

/// An immutable, timestamped status line appended during long-running work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Unique id, generated at creation and never reused
    pub id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Local>,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

impl ProgressEntry {
    pub fn new(message: impl Into<String>, kind: LogKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            timestamp: Local::now(),
            kind,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogKind::Info)
    }

    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(message, LogKind::Progress)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, LogKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LogKind::Error)
    }
}

/// Full conversation state for one research session
///
/// Owned exclusively by the in-flight turn; hosts keep the snapshot from the
/// previous turn and receive a new one when the turn completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    /// Conversation turns, in model-context order. The system prompt is not
    /// stored here; the decision node prepends it on every model call.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Chronological progress log, append-only
    #[serde(default)]
    pub logs: Vec<ProgressEntry>,
    /// Records from the last completed people search, replaced wholesale
    #[serde(default)]
    pub people: Vec<PersonRecord>,
    /// Human-readable status line, overwritten on each transition
    #[serde(default)]
    pub current_status: String,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a turn from a user message
    pub fn with_user_message(content: impl Into<String>) -> Self {
        let mut state = Self::default();
        state.messages.push(Message::user(content));
        state
    }

    /// Content of the most recent assistant message, if any
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "assistant")
            .and_then(|m| m.content.as_deref())
    }
}

/// A patch describing exactly which fields of [`AgentState`] a node changed
///
/// Messages and log entries are appended, `people` is replaced when present,
/// `status` overwrites when present. The control loop applies deltas in the
/// order the nodes produced them.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    pub messages: Vec<Message>,
    pub logs: Vec<ProgressEntry>,
    pub people: Option<Vec<PersonRecord>>,
    pub status: Option<String>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn push_log(mut self, entry: ProgressEntry) -> Self {
        self.logs.push(entry);
        self
    }

    pub fn replace_people(mut self, people: Vec<PersonRecord>) -> Self {
        self.people = Some(people);
        self
    }

    pub fn set_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.logs.is_empty()
            && self.people.is_none()
            && self.status.is_none()
    }

    /// Fold the patch into the state
    pub fn apply(self, state: &mut AgentState) {
        state.messages.extend(self.messages);
        state.logs.extend(self.logs);
        if let Some(people) = self.people {
            state.people = people;
        }
        if let Some(status) = self.status {
            state.current_status = status;
        }
    }
}

/// Observer side channel for state snapshots
///
/// Emissions are awaited by the caller before it proceeds, so a subscriber
/// that consumes them in order sees a monotonically growing log. Implementors
/// must tolerate repeated calls within one turn without external locking.
#[async_trait::async_trait]
pub trait StateSink: Send + Sync {
    async fn emit(&self, snapshot: AgentState);
}

/// Snapshot sender half of [`ChannelSink::channel`]
pub type SnapshotSender = mpsc::UnboundedSender<AgentState>;
/// Snapshot receiver half of [`ChannelSink::channel`]
pub type SnapshotReceiver = mpsc::UnboundedReceiver<AgentState>;

/// Publishes snapshots over an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: SnapshotSender,
}

impl ChannelSink {
    pub fn new(tx: SnapshotSender) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving half
    pub fn channel() -> (Self, SnapshotReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl StateSink for ChannelSink {
    async fn emit(&self, snapshot: AgentState) {
        trace!(
            logs = snapshot.logs.len(),
            status = %snapshot.current_status,
            "emitting state snapshot"
        );
        // Receiver may be gone (host stopped listening); emission stays
        // fire-and-forget in that case.
        let _ = self.tx.send(snapshot);
    }
}

/// Records every snapshot in memory; for tests and embedded hosts
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<AgentState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<AgentState> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl StateSink for MemorySink {
    async fn emit(&self, snapshot: AgentState) {
        self.snapshots.lock().unwrap().push(snapshot);
    }
}

/// Discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait::async_trait]
impl StateSink for NullSink {
    async fn emit(&self, _snapshot: AgentState) {}
}
