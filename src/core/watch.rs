//! # Watch records.
//!
//! A watch is split in two halves when it is created:
//!
//! ```text
//!              ┌─────────── Watch (moves into the streaming task) ──────────┐
//!              │ name, cancel token, locator, resume_from, StopSignal (tx)   │
//!  watch::pair ┤                                                             │
//!              │ WatchEntry (stays in the Registry)                          │
//!              └─ cancel token, resume_from, stop receiver (rx), JoinHandle ─┘
//! ```
//!
//! ## Rules
//! - The stop signal is sent **exactly once**, when the task's [`StopSignal`] is
//!   finished or dropped (including on panic unwind).
//! - The stop time is received **at most once**, by the registry, and cached.
//! - Until the stream is opened, the stop time is the watch's own `resume_from`:
//!   nothing was delivered, so a restart must not skip anything.

use std::time::SystemTime;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sources::{Locator, OpenRequest, Source, SourceName};

/// Task-side half of a watch.
pub struct Watch {
    /// Source identity, stable across restarts.
    pub name: SourceName,
    /// Fires when the watch should stop streaming.
    pub cancel: CancellationToken,
    /// Passed through to the log-source client.
    pub locator: Locator,
    /// Logs at or after this point should be delivered.
    pub resume_from: SystemTime,
    pub(crate) stop: StopSignal,
}

impl Watch {
    /// Builds the request handed to [`LogSource::open_stream`](crate::LogSource::open_stream).
    pub fn open_request(&self) -> OpenRequest {
        OpenRequest {
            source: self.name.clone(),
            locator: self.locator.clone(),
            since: self.resume_from,
        }
    }
}

/// Sending half of the one-shot stop-time rendezvous.
pub struct StopSignal {
    tx: Option<oneshot::Sender<SystemTime>>,
    resume_from: SystemTime,
    opened: bool,
}

impl StopSignal {
    /// Records that the stream was opened; from now on the stop time is the exit time.
    pub fn mark_opened(&mut self) {
        self.opened = true;
    }

    /// Sends `at` as the stop time. Later calls and the drop are no-ops.
    pub fn finish(&mut self, at: SystemTime) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(at);
        }
    }
}

impl Drop for StopSignal {
    fn drop(&mut self) {
        let at = if self.opened {
            SystemTime::now()
        } else {
            self.resume_from
        };
        self.finish(at);
    }
}

/// Registry-side half of a watch.
pub struct WatchEntry {
    cancel: CancellationToken,
    resume_from: SystemTime,
    stop_rx: oneshot::Receiver<SystemTime>,
    stopped_at: Option<SystemTime>,
    join: Option<JoinHandle<()>>,
}

impl WatchEntry {
    /// Requests cancellation. Does not wait for the task.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` while the task is expected to be serving its source.
    ///
    /// A watch stops being live once its token fires or its task has reported a stop time.
    pub fn is_live(&mut self) -> bool {
        if self.stopped_at.is_some() {
            return false;
        }
        match self.stop_rx.try_recv() {
            Ok(at) => {
                self.stopped_at = Some(at);
                false
            }
            Err(TryRecvError::Empty) => !self.cancel.is_cancelled(),
            Err(TryRecvError::Closed) => false,
        }
    }

    /// Receives the time the task stopped, waiting for the task to exit if needed.
    ///
    /// Only call this once the watch is no longer live, otherwise it waits for a
    /// task nobody asked to stop.
    pub async fn stopped_at(self) -> SystemTime {
        if let Some(at) = self.stopped_at {
            return at;
        }
        match self.stop_rx.await {
            Ok(at) => at,
            Err(_) => {
                tracing::warn!("watch exited without a stop time; reusing its resume point");
                self.resume_from
            }
        }
    }

    pub fn attach(&mut self, join: JoinHandle<()>) {
        self.join = Some(join);
    }

    pub fn take_join(&mut self) -> Option<JoinHandle<()>> {
        self.join.take()
    }
}

/// Creates both halves of a new watch for `source`.
pub fn pair(source: &Source, cancel: CancellationToken, resume_from: SystemTime) -> (Watch, WatchEntry) {
    let (tx, rx) = oneshot::channel();
    let watch = Watch {
        name: source.name.clone(),
        cancel: cancel.clone(),
        locator: source.locator.clone(),
        resume_from,
        stop: StopSignal {
            tx: Some(tx),
            resume_from,
            opened: false,
        },
    };
    let entry = WatchEntry {
        cancel,
        resume_from,
        stop_rx: rx,
        stopped_at: None,
        join: None,
    };
    (watch, entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn web() -> Source {
        Source::compose("web", "compose.yml")
    }

    #[tokio::test]
    async fn test_unopened_drop_reports_resume_point() {
        let resume = UNIX_EPOCH + Duration::from_secs(42);
        let (watch, mut entry) = pair(&web(), CancellationToken::new(), resume);
        assert!(entry.is_live());

        drop(watch);
        assert!(!entry.is_live());
        assert_eq!(entry.stopped_at().await, resume);
    }

    #[tokio::test]
    async fn test_opened_drop_reports_exit_time() {
        let before = SystemTime::now();
        let (mut watch, entry) = pair(&web(), CancellationToken::new(), UNIX_EPOCH);
        watch.stop.mark_opened();
        drop(watch);

        assert!(entry.stopped_at().await >= before);
    }

    #[tokio::test]
    async fn test_finish_sends_once() {
        let t1 = UNIX_EPOCH + Duration::from_secs(7);
        let (mut watch, entry) = pair(&web(), CancellationToken::new(), UNIX_EPOCH);
        watch.stop.mark_opened();
        watch.stop.finish(t1);
        watch.stop.finish(t1 + Duration::from_secs(1));
        drop(watch);

        assert_eq!(entry.stopped_at().await, t1);
    }

    #[tokio::test]
    async fn test_cancelled_watch_is_not_live() {
        let token = CancellationToken::new();
        let (_watch, mut entry) = pair(&web(), token.clone(), UNIX_EPOCH);
        assert!(entry.is_live());
        token.cancel();
        assert!(!entry.is_live());
    }

    #[tokio::test]
    async fn test_stopped_at_waits_for_exit() {
        let token = CancellationToken::new();
        let (watch, entry) = pair(&web(), token.clone(), UNIX_EPOCH);
        entry.cancel();

        let task = tokio::spawn(async move {
            watch.cancel.cancelled().await;
            drop(watch);
        });
        assert_eq!(entry.stopped_at().await, UNIX_EPOCH);
        task.await.unwrap();
    }
}
