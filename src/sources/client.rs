//! # Log-source client seam.
//!
//! A [`LogSource`] opens a continuous byte stream of one source's output. Where
//! the stream starts is up to the client: the consumer only passes the resume
//! point through in [`OpenRequest::since`].

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use super::state::{Locator, SourceName};
use crate::error::StreamError;

/// Owned byte stream of one source. Dropping it closes the stream.
pub type LogStream = Box<dyn AsyncRead + Send + Unpin>;

/// Parameters for opening a stream.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    /// Source identity (e.g. the compose service name).
    pub source: SourceName,
    /// Source-specific locator.
    pub locator: Locator,
    /// Logs at or after this point should be delivered.
    pub since: SystemTime,
}

impl OpenRequest {
    /// Returns `true` when the stream should start from the very beginning.
    pub fn from_beginning(&self) -> bool {
        self.since <= UNIX_EPOCH
    }
}

/// Client able to open a continuous log stream for a named source.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use logvisor::{LogSource, LogStream, OpenRequest, StreamError};
///
/// struct Canned;
///
/// #[async_trait]
/// impl LogSource for Canned {
///     async fn open_stream(
///         &self,
///         _ctx: &CancellationToken,
///         _req: &OpenRequest,
///     ) -> Result<LogStream, StreamError> {
///         Ok(Box::new(&b"hello\n"[..]))
///     }
/// }
/// ```
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Opens the stream. `ctx` is the watch's cancellation token; clients that
    /// spawn work should stop it when the token fires.
    async fn open_stream(
        &self,
        ctx: &CancellationToken,
        req: &OpenRequest,
    ) -> Result<LogStream, StreamError>;
}
