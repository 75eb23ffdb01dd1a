//! Error types used by the log manager and its streaming tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the manager itself (shutdown).
//! - [`StreamError`]: errors raised while opening or copying one source's stream.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! None of these errors is fatal to the process: stream errors are isolated to
//! the source they belong to, and reconciliation itself never fails.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the log manager runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some streaming tasks were still running.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of sources whose tasks did not exit in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use logvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck sources={stuck:?}")
            }
        }
    }
}

/// # Errors produced by a single source's log stream.
///
/// `Open` and `Copy` are unexpected failures: the task exits and the next
/// reconciliation restarts it from its stop time. `Canceled` is the expected
/// outcome of a teardown.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StreamError {
    /// The log-source client could not open the stream.
    #[error("open {source_name}: {error}")]
    Open {
        /// Source whose stream failed to open.
        source_name: String,
        /// Underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// Reading from the stream or writing to the outputs failed.
    #[error("copy failed: {error}")]
    Copy {
        /// Underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// The watch was cancelled.
    #[error("stream cancelled")]
    Canceled,
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use logvisor::StreamError;
    ///
    /// assert_eq!(StreamError::Canceled.as_label(), "stream_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Open { .. } => "stream_open_failed",
            StreamError::Copy { .. } => "stream_copy_failed",
            StreamError::Canceled => "stream_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Open { source_name, error } => {
                format!("error streaming {source_name} logs: {error}")
            }
            StreamError::Copy { error } => format!("copy: {error}"),
            StreamError::Canceled => "stream cancelled".to_string(),
        }
    }

    /// Convenience constructor for [`StreamError::Open`].
    pub fn open(source_name: impl Into<String>, error: io::Error) -> Self {
        StreamError::Open {
            source_name: source_name.into(),
            error,
        }
    }

    /// Indicates whether the failure is worth reporting.
    ///
    /// Returns `false` only for [`StreamError::Canceled`].
    pub fn is_unexpected(&self) -> bool {
        !matches!(self, StreamError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_message_names_source() {
        let err = StreamError::open("web", io::Error::other("no such service"));
        assert_eq!(err.as_label(), "stream_open_failed");
        assert_eq!(err.as_message(), "error streaming web logs: no such service");
        assert!(err.is_unexpected());
    }

    #[test]
    fn test_canceled_is_expected() {
        assert!(!StreamError::Canceled.is_unexpected());
    }

    #[test]
    fn test_grace_exceeded_lists_stuck() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(1),
            stuck: vec!["db".into()],
        };
        assert!(err.as_message().contains("db"));
    }
}
