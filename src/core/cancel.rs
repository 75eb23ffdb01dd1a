//! # Cancellable reads.
//!
//! [`CancelReader`] wraps any [`AsyncRead`] so that a pending read completes with
//! an error as soon as the associated [`CancellationToken`] fires, even when the
//! inner reader would keep waiting for bytes forever (a quiet `docker-compose logs -f`).
//!
//! ```text
//! poll_read ─► token cancelled? ──yes──► Err(read cancelled)
//!                  │ no (waker registered on the token)
//!                  ▼
//!              inner.poll_read
//! ```

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Reader whose reads fail promptly once `token` is cancelled.
pub struct CancelReader<R> {
    inner: R,
    token: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<R> CancelReader<R> {
    pub fn new(token: CancellationToken, inner: R) -> Self {
        let cancelled = Box::pin(token.clone().cancelled_owned());
        Self {
            inner,
            token,
            cancelled,
        }
    }
}

fn cancelled_error() -> io::Error {
    io::Error::other("read cancelled")
}

impl<R: AsyncRead + Unpin> AsyncRead for CancelReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        // Checked first so the completed future is never polled again.
        if this.token.is_cancelled() || this.cancelled.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Err(cancelled_error()));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}
