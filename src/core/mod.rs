//! Runtime core: reconciliation and watch lifecycle.
//!
//! The public API from this module is [`LogManager`] (with its builder) and the
//! [`CancelReader`] adapter.
//!
//! Internal modules:
//! - [`registry`]: watch arena and the setup/teardown diff;
//! - [`watch`]: the two halves of a watch and the stop-time rendezvous;
//! - [`runner`]: body of a streaming task (open, copy, report);
//! - [`manager`]: applies diffs, runs the change loop, shuts down;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod cancel;
mod manager;
mod registry;
mod runner;
mod shutdown;
mod watch;

pub use builder::LogManagerBuilder;
pub use cancel::CancelReader;
pub use manager::LogManager;
