//! Event system for publish progress
//!
//! An in-process event bus built on `tokio::sync::broadcast`. The posting
//! orchestrator emits one event when a publish starts, one per segment, and
//! one when it finishes; any number of subscribers (CLI progress output,
//! persistence, a UI) can listen.
//!
//! Emitting never blocks: with no subscribers the event is dropped, and a
//! lagging subscriber misses the oldest events rather than stalling the
//! publish loop.
//!
//! # Example
//!
//! ```
//! use libthreadcast::service::events::{EventBus, ThreadEvent};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(ThreadEvent::PublishStarted {
//!     thread_id: "thread-1".to_string(),
//!     platform: "mastodon".to_string(),
//!     segments: 3,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::ThreadStatus;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<ThreadEvent>;

/// Event bus for distributing publish progress events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ThreadEvent>,
}

impl EventBus {
    /// Create a new event bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: ThreadEvent) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Events emitted while a thread is being published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadEvent {
    /// Publishing started
    PublishStarted {
        thread_id: String,
        platform: String,
        /// Number of segments to publish
        segments: usize,
    },

    /// One segment was published
    SegmentPosted {
        thread_id: String,
        order: usize,
        remote_id: String,
        reply_to: Option<String>,
    },

    /// One segment could not be published; the thread continues
    SegmentFailed {
        thread_id: String,
        order: usize,
        error: String,
    },

    /// Every segment has an outcome
    PublishFinished {
        thread_id: String,
        status: ThreadStatus,
        succeeded: usize,
        failed: usize,
    },
}
