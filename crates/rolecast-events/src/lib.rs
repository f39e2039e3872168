//! Run progress event bus.
//!
//! The bus assigns sequential identifiers to run lifecycle events and keeps a
//! bounded replay ring so late subscribers (a chat front-end that attaches
//! after the acknowledgment was sent) can catch up. Internally it uses
//! `tokio::broadcast`; publishing never waits on subscribers and overflow drops
//! the oldest events.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

/// Identifier assigned to each published event.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Stream of envelopes returned by [`EventBus::subscribe`].
pub type EventStream = Pin<Box<dyn Stream<Item = EventEnvelope> + Send>>;

/// Run lifecycle events.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Targets were fetched and the run is about to mutate them.
    RunStarted {
        run_id: Uuid,
        guild_id: String,
        capability_id: String,
        total: usize,
        dry_run: bool,
    },
    Progress {
        run_id: Uuid,
        processed: usize,
        total: usize,
        success: usize,
        failed: usize,
    },
    RunCompleted {
        run_id: Uuid,
        success: usize,
        failed: usize,
    },
    /// The run aborted before any mutation (fetch failure).
    RunFailed { run_id: Uuid, message: String },
}

impl Event {
    /// Machine-friendly discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::Progress { .. } => "progress",
            Self::RunCompleted { .. } => "run_completed",
            Self::RunFailed { .. } => "run_failed",
        }
    }

    /// Run the event belongs to.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::Progress { run_id, .. }
            | Self::RunCompleted { run_id, .. }
            | Self::RunFailed { run_id, .. } => *run_id,
        }
    }

    /// Whether no further events follow for this run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::RunCompleted { .. } | Self::RunFailed { .. })
    }
}

/// Metadata wrapper tracking the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel and the replay ring share the capacity so dropped
    /// events affect both consistently.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish an event, assigning it the next sequential identifier.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        // No subscribers is fine.
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying buffered events newer than `since_id` first.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        // Attach before snapshotting the backlog so nothing falls between the two.
        let receiver = self.sender.subscribe();
        let backlog: Vec<EventEnvelope> = since_id.map_or_else(Vec::new, |since| {
            let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.iter().filter(|item| item.id > since).cloned().collect()
        });
        let replayed_up_to = backlog.last().map_or(0, |item| item.id);

        let live = BroadcastStream::new(receiver)
            .filter_map(Result::ok)
            .filter(move |item| item.id > replayed_up_to);
        Box::pin(tokio_stream::iter(backlog).chain(live))
    }

    /// Last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.back().map(|event| event.id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
