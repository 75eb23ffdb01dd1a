//! # LogManager: reconciles watches and drives their lifecycle.
//!
//! The [`LogManager`] owns the watch [`Registry`], the event bus and the
//! collaborators shared by streaming tasks. Every change notification runs one
//! reconciliation pass:
//!
//! ```text
//! on_change(ctx)
//!   ├─► state.snapshot()                (read lock held only for the copy)
//!   ├─► registry.diff(ctx, &snapshot)   → (setup, teardown)
//!   ├─► teardown: entry.cancel()        (non-blocking, all before any launch)
//!   └─► setup:    tokio::spawn(consume_logs(watch))
//! ```
//!
//! Task completion is never awaited here. It is observed on a later pass through
//! the watch's stop signal, which is how an exited stream gets resumed from the
//! point where it stopped.
//!
//! ## Rules
//! - `on_change` takes `&mut self`: passes are serialized by construction.
//! - At most one watch per source name is registered at any time. Cancellation
//!   is a request: a torn-down task may still be winding down when its source is
//!   set up again. `shutdown` waits for both.
//! - No backoff: a source whose stream keeps failing is relaunched on every pass.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::LogManagerBuilder;
use super::registry::{Diff, Registry};
use super::runner::{self, StreamDeps};
use super::shutdown;
use crate::{
    config::Config,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    sources::{SourceName, StateReader},
    subscribers::SubscriberSet,
};

/// Keeps one log-streaming task per desired source.
pub struct LogManager {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    state: Arc<dyn StateReader>,
    deps: Arc<StreamDeps>,
    registry: Registry,
    /// Tasks of torn-down watches that may still be winding down.
    detached: Vec<(SourceName, JoinHandle<()>)>,
}

impl LogManager {
    /// Returns a builder for a manager with the given configuration.
    pub fn builder(cfg: Config) -> LogManagerBuilder {
        LogManagerBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        state: Arc<dyn StateReader>,
        deps: Arc<StreamDeps>,
    ) -> Self {
        let registry = Registry::new(cfg.backend.clone());
        Self {
            cfg,
            bus,
            subs,
            state,
            deps,
            registry,
            detached: Vec::new(),
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// New watches get a child token of `ctx`; cancelling `ctx` stops all of them.
    pub async fn on_change(&mut self, ctx: &CancellationToken) {
        let snapshot = self.state.snapshot().await;
        let diff = self.registry.diff(ctx, &snapshot).await;
        if !diff.is_empty() {
            tracing::debug!(
                setup = diff.setup.len(),
                teardown = diff.teardown.len(),
                active = self.registry.len(),
                "reconciled log watches"
            );
        }
        let Diff { setup, teardown } = diff;

        for mut t in teardown {
            t.entry.cancel();
            self.bus
                .publish(Event::new(EventKind::WatchCancelled).with_source(t.name.clone()));
            if let Some(join) = t.entry.take_join() {
                self.detached.push((t.name, join));
            }
        }

        for watch in setup {
            let name = watch.name.clone();
            self.bus.publish(
                Event::new(EventKind::WatchStarted)
                    .with_source(name.clone())
                    .with_resume_from(watch.resume_from),
            );
            let join = tokio::spawn(runner::consume_logs(watch, Arc::clone(&self.deps)));
            self.registry.attach(&name, join);
        }

        self.detached.retain(|(_, join)| !join.is_finished());
    }

    /// Processes change notifications until `changes` closes, `token` is
    /// cancelled or the process receives a termination signal, then shuts down.
    ///
    /// Runs one pass up front. Notifications that pile up while a pass is
    /// running are coalesced into a single pass.
    pub async fn run(
        mut self,
        mut changes: mpsc::Receiver<()>,
        token: CancellationToken,
    ) -> Result<(), RuntimeError> {
        self.on_change(&token).await;

        let signal = shutdown::wait_for_shutdown_signal();
        tokio::pin!(signal);
        let mut signal_armed = true;

        loop {
            tokio::select! {
                res = &mut signal, if signal_armed => match res {
                    Ok(()) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot listen for shutdown signals");
                        signal_armed = false;
                    }
                },
                _ = token.cancelled() => break,
                msg = changes.recv() => match msg {
                    Some(()) => {
                        while changes.try_recv().is_ok() {}
                        self.on_change(&token).await;
                    }
                    None => break,
                },
            }
        }

        self.shutdown().await
    }

    /// Cancels every watch and waits up to [`Config::grace`] for their tasks.
    ///
    /// Tasks still running after the grace period are aborted and reported in
    /// [`RuntimeError::GraceExceeded`].
    pub async fn shutdown(&mut self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        let mut tasks: Vec<(SourceName, JoinHandle<()>)> = std::mem::take(&mut self.detached);
        for (name, mut entry) in self.registry.drain() {
            entry.cancel();
            if let Some(join) = entry.take_join() {
                tasks.push((name, join));
            }
        }

        let grace = self.cfg.grace;
        tracing::debug!(
            tasks = tasks.len(),
            subscribers = self.subs.len(),
            ?grace,
            "stopping log watches"
        );
        let all_done = async {
            for (_, join) in tasks.iter_mut() {
                let _ = join.await;
            }
        };

        if tokio::time::timeout(grace, all_done).await.is_ok() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            return Ok(());
        }

        let mut stuck: Vec<String> = Vec::new();
        for (name, join) in &tasks {
            if !join.is_finished() {
                join.abort();
                stuck.push(name.to_string());
            }
        }
        stuck.sort_unstable();
        self.bus
            .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")));
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Returns sorted names of the sources that currently have a watch.
    pub fn active(&self) -> Vec<String> {
        self.registry.list()
    }

    /// Event bus shared with streaming tasks.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}
