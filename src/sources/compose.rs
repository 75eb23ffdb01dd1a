//! # docker-compose log client.
//!
//! Streams a service's output with
//! `docker-compose -f <config> logs --follow --no-color [--since <unix>] <service>`.
//! The child process is killed when the returned stream is dropped. A non-zero
//! exit is reported as a read error at end of stdout, with the tail of stderr.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll, ready};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::client::{LogSource, LogStream, OpenRequest};
use crate::error::StreamError;

/// [`LogSource`] backed by the docker-compose CLI.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    program: String,
}

impl ComposeCli {
    /// Uses `docker-compose` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("docker-compose")
    }

    /// Uses a custom executable (e.g. an absolute path or a wrapper script).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the executable for `req`.
    pub fn args(req: &OpenRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            req.locator.as_path().display().to_string(),
            "logs".to_string(),
            "--follow".to_string(),
            "--no-color".to_string(),
        ];
        if !req.from_beginning() {
            let secs = req
                .since
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            args.push("--since".to_string());
            args.push(secs.to_string());
        }
        args.push(req.source.to_string());
        args
    }
}

impl Default for ComposeCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for ComposeCli {
    async fn open_stream(
        &self,
        ctx: &CancellationToken,
        req: &OpenRequest,
    ) -> Result<LogStream, StreamError> {
        if ctx.is_cancelled() {
            return Err(StreamError::Canceled);
        }

        let mut child = Command::new(&self.program)
            .args(Self::args(req))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StreamError::open(req.source.as_ref(), e))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(StreamError::open(
                req.source.as_ref(),
                io::Error::other("stdio not captured"),
            ));
        };

        tracing::debug!(source = %req.source, program = %self.program, "compose log stream opened");
        Ok(Box::new(ComposeStream {
            child: Some(child),
            stdout,
            stderr_tail: Some(drain_stderr(stderr)),
            exit: None,
            done: false,
        }))
    }
}

/// Most recent stderr bytes kept for the exit error.
const STDERR_TAIL: usize = 4096;

/// Child stdout that keeps its process alive exactly as long as the stream.
///
/// At end of stdout the child is reaped; a non-zero exit turns the end of
/// data into an error carrying the status and the tail of stderr.
struct ComposeStream {
    child: Option<Child>,
    stdout: ChildStdout,
    stderr_tail: Option<JoinHandle<Vec<u8>>>,
    exit: Option<BoxFuture<'static, io::Result<()>>>,
    done: bool,
}

impl AsyncRead for ComposeStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.done || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        if this.exit.is_none() {
            let before = buf.filled().len();
            ready!(Pin::new(&mut this.stdout).poll_read(cx, buf))?;
            if buf.filled().len() > before {
                return Poll::Ready(Ok(()));
            }
            let exit = check_exit(this.child.take(), this.stderr_tail.take());
            this.exit = Some(Box::pin(exit));
        }

        let Some(exit) = this.exit.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        let res = ready!(exit.as_mut().poll(cx));
        this.exit = None;
        this.done = true;
        Poll::Ready(res)
    }
}

/// Reads stderr to completion so the child never blocks on a full pipe.
fn drain_stderr(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut tail = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match stderr.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    tail.extend_from_slice(&buf[..n]);
                    if tail.len() > STDERR_TAIL {
                        let cut = tail.len() - STDERR_TAIL;
                        tail.drain(..cut);
                    }
                }
            }
        }
        tail
    })
}

async fn check_exit(child: Option<Child>, stderr: Option<JoinHandle<Vec<u8>>>) -> io::Result<()> {
    let Some(mut child) = child else {
        return Ok(());
    };
    let status = child.wait().await?;
    if status.success() {
        return Ok(());
    }

    let tail = match stderr {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    };
    let tail = String::from_utf8_lossy(&tail);
    let tail = tail.trim();
    let msg = if tail.is_empty() {
        format!("docker-compose {status}")
    } else {
        format!("docker-compose {status}: {tail}")
    };
    Err(io::Error::other(msg))
}
