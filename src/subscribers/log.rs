//! # LogWriter: tracing-backed event printer
//!
//! Renders bus events as `tracing` events under target `logvisor::events`.
//! Log bytes themselves (`LogReceived`) are only emitted at `trace`; the display
//! sink is the place they are shown to humans.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO  logvisor::events: watch started source="web" resume_from=1700000000
//! WARN  logvisor::events: stream failed source="web" error="connection reset"
//! WARN  logvisor::events: grace exceeded stuck="web"
//! ```

use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tracing::Level;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Level each event kind is rendered at.
///
/// Lifecycle at `info`, stream failures and runtime trouble at `warn`, quiet
/// stream exits at `debug`, log chunks at `trace`.
pub(crate) fn severity(kind: EventKind) -> Level {
    match kind {
        EventKind::WatchStarted
        | EventKind::WatchCancelled
        | EventKind::ShutdownRequested
        | EventKind::AllStoppedWithin => Level::INFO,
        EventKind::StreamOpenFailed
        | EventKind::StreamFailed
        | EventKind::SubscriberOverflow
        | EventKind::SubscriberPanicked
        | EventKind::GraceExceeded => Level::WARN,
        EventKind::StreamEnded | EventKind::StreamCancelled => Level::DEBUG,
        EventKind::LogReceived => Level::TRACE,
    }
}

macro_rules! emit {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!(target: "logvisor::events", $($rest)+),
            Level::WARN => tracing::warn!(target: "logvisor::events", $($rest)+),
            Level::INFO => tracing::info!(target: "logvisor::events", $($rest)+),
            Level::DEBUG => tracing::debug!(target: "logvisor::events", $($rest)+),
            _ => tracing::trace!(target: "logvisor::events", $($rest)+),
        }
    };
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        let level = severity(e.kind);
        match e.kind {
            EventKind::WatchStarted => {
                let resume_from = e
                    .resume_from
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                emit!(level, source, resume_from, "watch started");
            }
            EventKind::WatchCancelled => emit!(level, source, "watch cancelled"),
            EventKind::StreamOpenFailed => emit!(level, source, error = reason, "stream open failed"),
            EventKind::StreamFailed => emit!(level, source, error = reason, "stream failed"),
            EventKind::StreamEnded => emit!(level, source, "stream ended"),
            EventKind::StreamCancelled => emit!(level, source, "stream cancelled"),
            EventKind::LogReceived => {
                let bytes = e.log.as_ref().map_or(0, |l| l.len());
                emit!(level, source, bytes, "log received");
            }
            EventKind::SubscriberOverflow => {
                emit!(level, subscriber = source, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                emit!(level, subscriber = source, info = reason, "subscriber panicked");
            }
            EventKind::ShutdownRequested => emit!(level, "shutdown requested"),
            EventKind::AllStoppedWithin => emit!(level, "all streams stopped within grace"),
            EventKind::GraceExceeded => emit!(level, stuck = reason, "grace exceeded"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_warnings() {
        assert_eq!(severity(EventKind::StreamOpenFailed), Level::WARN);
        assert_eq!(severity(EventKind::StreamFailed), Level::WARN);
        assert_eq!(severity(EventKind::GraceExceeded), Level::WARN);
    }

    #[test]
    fn test_lifecycle_and_log_levels() {
        assert_eq!(severity(EventKind::WatchStarted), Level::INFO);
        assert_eq!(severity(EventKind::StreamCancelled), Level::DEBUG);
        assert_eq!(severity(EventKind::LogReceived), Level::TRACE);
    }

    #[tokio::test]
    async fn test_every_kind_renders() {
        let w = LogWriter::new();
        let kinds = [
            EventKind::WatchStarted,
            EventKind::StreamFailed,
            EventKind::LogReceived,
            EventKind::GraceExceeded,
        ];
        for kind in kinds {
            w.on_event(&Event::new(kind).with_source("web")).await;
        }
    }
}
