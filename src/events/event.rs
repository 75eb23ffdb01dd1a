//! # Events emitted by the log manager and its streaming tasks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Watch events**: reconciliation decisions (started, cancelled)
//! - **Stream events**: how a streaming task ended
//! - **Log events**: filtered log bytes for a source
//! - **Runtime events**: subscribers and shutdown
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use logvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StreamFailed)
//!     .with_source("web")
//!     .with_reason("broken pipe");
//!
//! assert_eq!(ev.kind, EventKind::StreamFailed);
//! assert_eq!(ev.source.as_deref(), Some("web"));
//! assert_eq!(ev.reason.as_deref(), Some("broken pipe"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Watch events ===
    /// A streaming task was launched for a source.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `resume_from`: point the stream was asked to start from
    WatchStarted,

    /// A source is no longer desired; its task was asked to stop.
    ///
    /// Sets:
    /// - `source`: source name
    WatchCancelled,

    // === Stream events ===
    /// The log-source client failed to open the stream.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: error message
    StreamOpenFailed,

    /// Copying failed while the watch was not cancelled.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: error message
    StreamFailed,

    /// The stream reached end of data.
    ///
    /// Sets:
    /// - `source`: source name
    StreamEnded,

    /// The stream stopped because its watch was cancelled.
    ///
    /// Sets:
    /// - `source`: source name
    StreamCancelled,

    // === Log events ===
    /// Filtered log bytes for a source.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `log`: the bytes, copied out of the read buffer
    LogReceived,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (OS signal, token or closed change channel).
    ShutdownRequested,

    /// All streaming tasks exited within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some tasks did not exit in time.
    ///
    /// Sets:
    /// - `reason`: names of the stuck sources
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the source (or subscriber), if applicable.
    pub source: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Resume point of a newly started watch.
    pub resume_from: Option<SystemTime>,
    /// Log bytes (only for `LogReceived`).
    pub log: Option<Arc<[u8]>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            reason: None,
            resume_from: None,
            log: None,
        }
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the resume point of a watch.
    #[inline]
    pub fn with_resume_from(mut self, at: SystemTime) -> Self {
        self.resume_from = Some(at);
        self
    }

    /// Attaches log bytes.
    #[inline]
    pub fn with_log(mut self, log: Arc<[u8]>) -> Self {
        self.log = Some(log);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::StreamEnded);
        let b = Event::new(EventKind::StreamEnded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_log_payload_is_shared() {
        let bytes: Arc<[u8]> = Arc::from(&b"hello\n"[..]);
        let ev = Event::new(EventKind::LogReceived)
            .with_source("web")
            .with_log(bytes.clone());
        let copy = ev.clone();
        assert!(Arc::ptr_eq(copy.log.as_ref().unwrap(), &bytes));
    }
}
