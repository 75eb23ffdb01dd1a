//! # Output writers.
//!
//! Every chunk read from a source's stream is written to a [`MultiWriter`] that
//! fans it out to:
//! - [`GlobalLogWriter`]: forwards to the process-wide display sink;
//! - [`ActionWriter`]: dispatches a [`LogAction`](crate::LogAction) tagged with the source name.
//!
//! Both apply the same [`LogFilter`]. A filtered chunk counts as fully written:
//! filtering is never a write error.

mod action;
mod filter;
mod global;
mod multi;

pub use action::ActionWriter;
pub use filter::LogFilter;
pub use global::GlobalLogWriter;
pub use multi::MultiWriter;
