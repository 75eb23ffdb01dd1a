use std::sync::Arc;

use crate::{
    config::Config,
    events::Bus,
    sources::{DisplaySink, Dispatch, LogSource, StateReader, TracingSink},
    subscribers::{Subscribe, SubscriberSet},
    writers::LogFilter,
};

use super::{manager::LogManager, runner::StreamDeps};

/// Builder for constructing a [`LogManager`] with optional collaborators.
pub struct LogManagerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    dispatcher: Option<Arc<dyn Dispatch>>,
    sink: Option<Arc<dyn DisplaySink>>,
}

impl LogManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            dispatcher: None,
            sink: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive runtime events (watch lifecycle, stream outcomes,
    /// log chunks) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the receiver of per-source log actions.
    ///
    /// Defaults to the manager's own event bus (`LogReceived` events).
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatch>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Sets the process-wide display sink. Defaults to [`TracingSink`].
    pub fn with_sink(mut self, sink: Arc<dyn DisplaySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the manager.
    ///
    /// Initializes the event bus, subscriber workers and the listener forwarding
    /// bus events to them. Must be called from within a tokio runtime.
    pub fn build(self, state: Arc<dyn StateReader>, client: Arc<dyn LogSource>) -> LogManager {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        if !subs.is_empty() {
            subscriber_listener(&bus, Arc::clone(&subs));
        }

        let dispatcher = self
            .dispatcher
            .unwrap_or_else(|| Arc::new(bus.clone()) as Arc<dyn Dispatch>);
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn DisplaySink>);

        let deps = Arc::new(StreamDeps {
            client,
            sink,
            dispatcher,
            bus: bus.clone(),
            filter: LogFilter::new(self.cfg.noise_prefixes.iter().cloned()),
            level: self.cfg.display_level,
            copy_buffer: self.cfg.copy_buffer_clamped(),
        });

        LogManager::new_internal(self.cfg, bus, subs, state, deps)
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
