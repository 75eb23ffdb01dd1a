//! # State-change dispatcher seam.
//!
//! [`Dispatch`] accepts structured [`LogAction`]s. The event [`Bus`] implements it by
//! publishing [`EventKind::LogReceived`] so subscribers see log bytes alongside
//! lifecycle events.

use std::sync::Arc;

use super::state::SourceName;
use crate::events::{Bus, Event, EventKind};

/// Log bytes attributed to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAction {
    pub source: SourceName,
    pub log: Arc<[u8]>,
}

/// Fire-and-forget receiver of log actions.
///
/// Implementations must not block the caller meaningfully: they are invoked
/// from inside a streaming task's write path.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, action: LogAction);
}

impl Dispatch for Bus {
    fn dispatch(&self, action: LogAction) {
        self.publish(
            Event::new(EventKind::LogReceived)
                .with_source(action.source)
                .with_log(action.log),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bus_dispatch_publishes_log_event() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.dispatch(LogAction {
            source: "web".into(),
            log: Arc::from(&b"GET /\n"[..]),
        });

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::LogReceived);
        assert_eq!(ev.source.as_deref(), Some("web"));
        assert_eq!(ev.log.as_deref(), Some(&b"GET /\n"[..]));
    }
}
