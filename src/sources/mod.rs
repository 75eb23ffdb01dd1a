//! # External collaborators.
//!
//! The reconciliation core only talks to the outside world through these seams:
//! - [`StateReader`]: desired sources plus the global "watching enabled" flag;
//! - [`LogSource`]: opens a continuous byte stream for one source;
//! - [`DisplaySink`]: process-wide sink for human-readable output;
//! - [`Dispatch`]: receives structured [`LogAction`]s per source.
//!
//! Each trait ships with a default implementation: [`StateStore`], [`ComposeCli`],
//! [`TracingSink`] and the event [`Bus`](crate::events::Bus).

mod client;
mod compose;
mod dispatch;
mod sink;
mod state;

pub use client::{LogSource, LogStream, OpenRequest};
pub use compose::ComposeCli;
pub use dispatch::{Dispatch, LogAction};
pub use sink::{DisplaySink, TracingSink};
pub use state::{Backend, Locator, Snapshot, Source, SourceName, StateReader, StateStore};
