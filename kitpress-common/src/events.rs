//! Event types for the kitpress conversion pipeline
//!
//! Events are broadcast via [`EventBus`] so that any frontend (CLI progress
//! line, future web shell) can observe batch progress without the driver
//! knowing who is listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Conversion pipeline events
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to an out-of-process frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConvertEvent {
    /// A batch run started
    BatchStarted {
        /// Number of items in the batch
        total: usize,
        /// Whether this run writes a kit plan rather than the raw selection
        kit: bool,
        /// When the batch started
        timestamp: DateTime<Utc>,
    },

    /// Conversion of one item started
    ItemStarted {
        /// Zero-based position within the batch
        index: usize,
        /// Number of items in the batch
        total: usize,
        /// Display name of the input
        name: String,
        /// When conversion started
        timestamp: DateTime<Utc>,
    },

    /// A conflicting output name is awaiting a user decision
    ConflictPrompted {
        /// The output name that already exists at the destination
        name: String,
        /// When the prompt was raised
        timestamp: DateTime<Utc>,
    },

    /// One item was converted and placed
    ItemCompleted {
        /// Zero-based position within the batch
        index: usize,
        /// Number of items in the batch
        total: usize,
        /// Name the output was placed under
        output_name: String,
        /// When placement finished
        timestamp: DateTime<Utc>,
    },

    /// The whole batch finished successfully
    BatchCompleted {
        /// Number of items placed
        converted: usize,
        /// Wall-clock duration of the batch
        duration_seconds: u64,
        /// When the batch finished
        timestamp: DateTime<Utc>,
    },

    /// The batch was cancelled by the user
    ///
    /// Already-placed items stand; this is an informational outcome,
    /// not a failure.
    BatchCancelled {
        /// Number of items placed before cancellation
        converted: usize,
        /// When cancellation was observed
        timestamp: DateTime<Utc>,
    },

    /// The batch stopped on a failure
    BatchFailed {
        /// Number of items placed before the failure
        converted: usize,
        /// Diagnostic text for the failure
        reason: String,
        /// When the failure was observed
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`ConvertEvent`]
///
/// Wraps a `tokio::sync::broadcast` channel. Subscribers receive all events
/// emitted after subscription; slow subscribers lag rather than block the
/// driver.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConvertEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use kitpress_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ConvertEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` when no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ConvertEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<ConvertEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress events are lossy by design: it is acceptable for a batch to
    /// run with nobody watching.
    ///
    /// # Examples
    ///
    /// ```
    /// use kitpress_common::events::{ConvertEvent, EventBus};
    ///
    /// let event_bus = EventBus::new(100);
    /// event_bus.emit_lossy(ConvertEvent::BatchStarted {
    ///     total: 3,
    ///     kit: false,
    ///     timestamp: chrono::Utc::now(),
    /// });
    /// ```
    pub fn emit_lossy(&self, event: ConvertEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the channel capacity this bus was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
