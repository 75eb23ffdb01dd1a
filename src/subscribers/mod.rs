//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! consume_logs / LogManager ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                              │
//!                                                     SubscriberSet::emit(&Event)
//!                                                 ┌────────────┼────────────┐
//!                                                 ▼            ▼            ▼
//!                                             LogWriter     Custom       Custom
//! ```
//!
//! `LogReceived` events carry the bytes dispatched by the action writer, so a
//! subscriber is where per-source log state gets built.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
