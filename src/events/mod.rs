//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the log manager and its streaming tasks.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `LogManager` (setup/teardown/shutdown), `runner::consume_logs`
//!   (stream outcome), `ActionWriter` through [`Dispatch`](crate::Dispatch) (log chunks),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
