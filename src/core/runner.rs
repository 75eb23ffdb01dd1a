//! # Stream one source's logs until the stream ends, fails or is cancelled.
//!
//! Body of every streaming task launched by the [`LogManager`](crate::LogManager).
//!
//! ## Flow
//! ```text
//! consume_logs(watch)
//!   ├─► client.open_stream(token, {source, locator, since: resume_from})
//!   │      └─ Err ──► log + StreamOpenFailed ──────────────┐
//!   ├─► stop.mark_opened()                                  │
//!   ├─► copy(CancelReader(stream) ─► MultiWriter[global, action])
//!   │      ├─ Ok (EOF)               ─► StreamEnded ────────┤
//!   │      ├─ Err, token cancelled   ─► StreamCancelled ────┤
//!   │      └─ Err, token not fired   ─► log + StreamFailed ─┤
//!   └─► drop(stream)                                         ▼
//!                                        StopSignal dropped: stop time sent
//!                                        then the outcome event is published
//! ```
//!
//! ## Rules
//! - No retry here; the next reconciliation restarts the watch from its stop time.
//! - A stream that never opened reports its own resume point as the stop time,
//!   not the exit time: nothing was delivered, so the restart must not skip the gap.
//! - The stream is dropped before the stop signal on every path.
//! - Errors are logged with `tracing` at `info`, like any other source output.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::Level;

use super::cancel::CancelReader;
use super::watch::{StopSignal, Watch};
use crate::{
    error::StreamError,
    events::{Bus, Event, EventKind},
    sources::{DisplaySink, Dispatch, LogSource, OpenRequest, SourceName},
    writers::{ActionWriter, GlobalLogWriter, LogFilter, MultiWriter},
};

/// Collaborators shared by every streaming task of one manager.
pub struct StreamDeps {
    pub client: Arc<dyn LogSource>,
    pub sink: Arc<dyn DisplaySink>,
    pub dispatcher: Arc<dyn Dispatch>,
    pub bus: Bus,
    pub filter: LogFilter,
    pub level: Level,
    pub copy_buffer: usize,
}

/// Runs one watch to completion and publishes how it ended.
pub async fn consume_logs(watch: Watch, deps: Arc<StreamDeps>) {
    let req = watch.open_request();
    let Watch {
        name,
        cancel,
        mut stop,
        ..
    } = watch;

    let res = stream_logs(&name, &cancel, &req, &mut stop, &deps).await;
    let (kind, err) = match res {
        Ok(copied) => {
            tracing::debug!(source = %name, bytes = copied, "log stream ended");
            (EventKind::StreamEnded, None)
        }
        Err(e) if !e.is_unexpected() => (EventKind::StreamCancelled, None),
        Err(e @ StreamError::Open { .. }) => {
            tracing::info!(source = %name, kind = e.as_label(), "{}", e.as_message());
            (EventKind::StreamOpenFailed, Some(e))
        }
        Err(e) => {
            tracing::info!(source = %name, kind = e.as_label(), error = %e, "error streaming {name} logs");
            (EventKind::StreamFailed, Some(e))
        }
    };
    // Stop time goes out before the event so observers never see a live watch.
    drop(stop);
    publish(&deps.bus, kind, &name, err.as_ref());
}

/// Opens and copies the stream. The stream is dropped before returning.
async fn stream_logs(
    name: &SourceName,
    cancel: &CancellationToken,
    req: &OpenRequest,
    stop: &mut StopSignal,
    deps: &StreamDeps,
) -> Result<u64, StreamError> {
    let stream = deps.client.open_stream(cancel, req).await?;
    stop.mark_opened();

    let writers: Vec<Box<dyn Write + Send>> = vec![
        Box::new(GlobalLogWriter::new(
            deps.sink.writer(deps.level),
            deps.filter.clone(),
        )),
        Box::new(ActionWriter::new(
            Arc::clone(&deps.dispatcher),
            name.clone(),
            deps.filter.clone(),
        )),
    ];
    let mut out = MultiWriter::new(writers);
    let mut reader = CancelReader::new(cancel.clone(), stream);

    let copied = copy(&mut reader, &mut out, deps.copy_buffer).await;
    if let Err(e) = out.flush() {
        tracing::debug!(source = %name, error = %e, "flushing log writers failed");
    }

    match copied {
        Ok(n) => Ok(n),
        Err(_) if cancel.is_cancelled() => Err(StreamError::Canceled),
        Err(error) => Err(StreamError::Copy { error }),
    }
}

/// Copies `reader` into `writer` chunk by chunk until end of data.
///
/// Each chunk is handed to the writer exactly as read, so chunk-level filters
/// see the same boundaries the source produced.
async fn copy<R, W>(reader: &mut R, writer: &mut W, buf_size: usize) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
}

fn publish(bus: &Bus, kind: EventKind, name: &SourceName, err: Option<&StreamError>) {
    let mut ev = Event::new(kind).with_source(name.clone());
    if let Some(e) = err {
        ev = ev.with_reason(e.to_string());
    }
    bus.publish(ev);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::watch;
    use crate::sources::{LogAction, LogStream, Source};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tokio::io::{AsyncWriteExt, DuplexStream};

    /// Serves pre-built streams, one per open call.
    struct FakeSource {
        streams: Mutex<Vec<io::Result<LogStream>>>,
        requests: Mutex<Vec<OpenRequest>>,
    }

    impl FakeSource {
        fn new(streams: Vec<io::Result<LogStream>>) -> Arc<Self> {
            Arc::new(Self {
                streams: Mutex::new(streams),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LogSource for FakeSource {
        async fn open_stream(
            &self,
            _ctx: &CancellationToken,
            req: &OpenRequest,
        ) -> Result<LogStream, StreamError> {
            self.requests.lock().unwrap().push(req.clone());
            match self.streams.lock().unwrap().pop() {
                Some(Ok(s)) => Ok(s),
                Some(Err(e)) => Err(StreamError::open(req.source.as_ref(), e)),
                None => Err(StreamError::open(
                    req.source.as_ref(),
                    io::Error::other("no stream"),
                )),
            }
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl DisplaySink for Captured {
        fn writer(&self, _level: Level) -> Box<dyn Write + Send> {
            Box::new(self.clone())
        }
    }

    #[derive(Default)]
    struct Actions(Mutex<Vec<LogAction>>);

    impl Dispatch for Actions {
        fn dispatch(&self, action: LogAction) {
            self.0.lock().unwrap().push(action);
        }
    }

    struct Harness {
        deps: Arc<StreamDeps>,
        display: Captured,
        actions: Arc<Actions>,
        source: Arc<FakeSource>,
        events: tokio::sync::broadcast::Receiver<Event>,
    }

    fn harness(streams: Vec<io::Result<LogStream>>) -> Harness {
        let display = Captured::default();
        let actions = Arc::new(Actions::default());
        let source = FakeSource::new(streams);
        let bus = Bus::new(64);
        let events = bus.subscribe();
        let deps = Arc::new(StreamDeps {
            client: source.clone(),
            sink: Arc::new(display.clone()),
            dispatcher: actions.clone(),
            bus,
            filter: LogFilter::default(),
            level: Level::INFO,
            copy_buffer: 1024,
        });
        Harness {
            deps,
            display,
            actions,
            source,
            events,
        }
    }

    fn web() -> Source {
        Source::compose("web", "docker-compose.yml")
    }

    async fn duplex_with(lines: &[&[u8]]) -> (DuplexStream, LogStream) {
        let (mut tx, rx) = tokio::io::duplex(4096);
        for l in lines {
            tx.write_all(l).await.unwrap();
            tx.flush().await.unwrap();
            tokio::task::yield_now().await;
        }
        (tx, Box::new(rx))
    }

    #[tokio::test]
    async fn test_copies_to_both_outputs_until_eof() {
        let (tx, stream) = duplex_with(&[b"web_1 | ready\n"]).await;
        drop(tx);
        let mut h = harness(vec![Ok(stream)]);
        let resume = UNIX_EPOCH + Duration::from_secs(5);
        let (w, entry) = watch::pair(&web(), CancellationToken::new(), resume);

        let before = SystemTime::now();
        consume_logs(w, h.deps.clone()).await;

        assert_eq!(*h.display.0.lock().unwrap(), b"web_1 | ready\n");
        let actions = h.actions.0.lock().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(&*actions[0].source, "web");
        assert_eq!(h.source.requests.lock().unwrap()[0].since, resume);

        assert!(entry.stopped_at().await >= before);
        assert_eq!(h.events.recv().await.unwrap().kind, EventKind::StreamEnded);
    }

    #[tokio::test]
    async fn test_banner_is_filtered_from_outputs() {
        let stream: LogStream = Box::new(&b"Attaching to app_web_1\n"[..]);
        let h = harness(vec![Ok(stream)]);
        let (w, _entry) = watch::pair(&web(), CancellationToken::new(), UNIX_EPOCH);

        consume_logs(w, h.deps.clone()).await;

        assert!(h.display.0.lock().unwrap().is_empty());
        assert!(h.actions.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_failure_keeps_resume_point() {
        let mut h = harness(vec![Err(io::Error::other("compose not found"))]);
        let resume = UNIX_EPOCH + Duration::from_secs(1234);
        let (w, entry) = watch::pair(&web(), CancellationToken::new(), resume);

        consume_logs(w, h.deps.clone()).await;

        assert_eq!(entry.stopped_at().await, resume);
        let ev = h.events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::StreamOpenFailed);
        assert!(ev.reason.unwrap().contains("compose not found"));
    }

    #[tokio::test]
    async fn test_cancel_stops_stalled_stream_quietly() {
        let (tx, stream) = duplex_with(&[b"web_1 | one\n"]).await;
        let mut h = harness(vec![Ok(stream)]);
        let token = CancellationToken::new();
        let (w, entry) = watch::pair(&web(), token.clone(), UNIX_EPOCH);

        let task = tokio::spawn(consume_logs(w, h.deps.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        entry.cancel();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("task must exit after cancel")
            .unwrap();
        assert_eq!(h.events.recv().await.unwrap().kind, EventKind::StreamCancelled);
        assert_eq!(*h.display.0.lock().unwrap(), b"web_1 | one\n");
        assert!(entry.stopped_at().await > UNIX_EPOCH);
        drop(tx);
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    #[tokio::test]
    async fn test_unexpected_copy_error_is_reported() {
        let stream: LogStream = Box::new(FailingReader);
        let mut h = harness(vec![Ok(stream)]);
        let (w, entry) = watch::pair(&web(), CancellationToken::new(), UNIX_EPOCH);

        consume_logs(w, h.deps.clone()).await;

        assert_eq!(h.events.recv().await.unwrap().kind, EventKind::StreamFailed);
        assert!(entry.stopped_at().await > UNIX_EPOCH);
    }

    fn deps_with(
        client: Arc<dyn LogSource>,
        sink: Arc<dyn DisplaySink>,
    ) -> (Arc<StreamDeps>, tokio::sync::broadcast::Receiver<Event>) {
        let bus = Bus::new(64);
        let events = bus.subscribe();
        let deps = Arc::new(StreamDeps {
            client,
            sink,
            dispatcher: Arc::new(Actions::default()),
            bus,
            filter: LogFilter::default(),
            level: Level::INFO,
            copy_buffer: 1024,
        });
        (deps, events)
    }

    #[tokio::test]
    async fn test_failing_compose_is_stream_failure() {
        let client = Arc::new(crate::sources::ComposeCli::with_program("false"));
        let (deps, mut events) = deps_with(client, Arc::new(Captured::default()));
        let (w, _entry) = watch::pair(&web(), CancellationToken::new(), UNIX_EPOCH);

        consume_logs(w, deps).await;

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::StreamFailed);
        assert!(ev.reason.unwrap().contains("exit status"));
    }

    /// Display writer that accepts bytes but cannot flush.
    #[derive(Clone, Default)]
    struct Unflushable(Captured);

    impl Write for Unflushable {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    impl DisplaySink for Unflushable {
        fn writer(&self, _level: Level) -> Box<dyn Write + Send> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn test_flush_error_does_not_fail_stream() {
        let stream: LogStream = Box::new(&b"web_1 | done\n"[..]);
        let display = Unflushable::default();
        let (deps, mut events) = deps_with(FakeSource::new(vec![Ok(stream)]), Arc::new(display.clone()));
        let (w, _entry) = watch::pair(&web(), CancellationToken::new(), UNIX_EPOCH);

        consume_logs(w, deps).await;

        assert_eq!(events.recv().await.unwrap().kind, EventKind::StreamEnded);
        assert_eq!(*display.0.0.lock().unwrap(), b"web_1 | done\n");
    }
}
