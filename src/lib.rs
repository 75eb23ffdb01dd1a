//! # logvisor
//!
//! **Logvisor** keeps one log-streaming task alive per desired source and
//! delivers what each source prints to a process-wide display sink and to a
//! per-source dispatcher.
//!
//! It is driven by change notifications: on every change it reads a snapshot of
//! the desired state, works out which watches to start and which to cancel, and
//! launches or cancels streaming tasks accordingly. A stream that exits on its
//! own is restarted on the next change from the moment it stopped, so nothing
//! is replayed twice.
//!
//! ## Architecture
//! ```text
//!  StateReader ──snapshot──►┌───────────────────────────────────────────────┐
//!                           │  LogManager                                   │
//!  change notifications ───►│  - Registry (watches by source name)          │
//!                           │  - Bus (broadcast events)                     │
//!                           │  - SubscriberSet (fans out to subscribers)    │
//!                           └──────┬──────────────────┬─────────────────────┘
//!                         setup    ▼                  ▼  teardown: cancel token
//!                    ┌──────────────────┐   ┌──────────────────┐
//!                    │ consume_logs(A)  │   │ consume_logs(B)  │
//!                    └────────┬─────────┘   └────────┬─────────┘
//!                             ▼                      ▼
//!               LogSource::open_stream ─► CancelReader ─► MultiWriter
//!                                                        ├─► GlobalLogWriter ─► DisplaySink
//!                                                        └─► ActionWriter    ─► Dispatch
//! ```
//!
//! Both writers drop noise chunks (the compose `Attaching to ...` banner by
//! default) through the same [`LogFilter`].
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                     |
//! |-----------------|--------------------------------------------------------------|----------------------------------------|
//! | **Reconcile**   | Diff desired sources against active watches.                 | [`LogManager`], [`Snapshot`]           |
//! | **Streaming**   | Open, copy and cancel one source's log stream.               | [`LogSource`], [`CancelReader`]        |
//! | **Output**      | Filtered fan-out to display and dispatcher.                  | [`DisplaySink`], [`Dispatch`]          |
//! | **Events**      | Watch and stream lifecycle on a broadcast bus.               | [`Event`], [`EventKind`], [`Bus`]      |
//! | **Subscribers** | React to events with isolated, bounded workers.              | [`Subscribe`], [`SubscriberSet`]       |
//! | **Config**      | Noise prefixes, display level, buffer and shutdown grace.    | [`Config`]                             |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber (enabled by default).
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use logvisor::{ComposeCli, Config, LogManager, Snapshot, Source, StateStore};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), logvisor::RuntimeError> {
//!     let store = StateStore::new(Snapshot::enabled([
//!         Source::compose("web", "docker-compose.yml"),
//!     ]));
//!     let manager = LogManager::builder(Config::default())
//!         .build(store.clone(), Arc::new(ComposeCli::new()));
//!
//!     let (changes, rx) = mpsc::channel(16);
//!     tokio::spawn(async move {
//!         store.upsert(Source::compose("db", "docker-compose.yml")).await;
//!         let _ = changes.send(()).await;
//!     });
//!
//!     manager.run(rx, CancellationToken::new()).await
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod sources;
mod subscribers;
mod writers;

pub use config::{COMPOSE_ATTACH_BANNER, Config};
pub use core::{CancelReader, LogManager, LogManagerBuilder};
pub use error::{RuntimeError, StreamError};
pub use events::{Bus, Event, EventKind};
pub use sources::{
    Backend, ComposeCli, DisplaySink, Dispatch, Locator, LogAction, LogSource, LogStream,
    OpenRequest, Snapshot, Source, SourceName, StateReader, StateStore, TracingSink,
};
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
pub use subscribers::{Subscribe, SubscriberSet};
pub use writers::{ActionWriter, GlobalLogWriter, LogFilter, MultiWriter};
