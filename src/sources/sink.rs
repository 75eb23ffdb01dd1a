//! # Display sink seam.
//!
//! A [`DisplaySink`] hands out byte writers for human-readable output at a level.
//! [`TracingSink`] turns every line written into a tracing event.

use std::io::{self, Write};

use tracing::Level;

/// Process-wide sink for already-filtered log bytes.
pub trait DisplaySink: Send + Sync + 'static {
    /// Returns a writer for output at `level`.
    fn writer(&self, level: Level) -> Box<dyn Write + Send>;
}

/// Display sink backed by `tracing`.
///
/// Bytes are split on `\n`; each complete line becomes one event with target
/// `logvisor::display`. A trailing partial line is held until the next write or
/// until the writer is flushed or dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn writer(&self, level: Level) -> Box<dyn Write + Send> {
        Box::new(TracingWriter {
            level,
            pending: Vec::new(),
        })
    }
}

struct TracingWriter {
    level: Level,
    pending: Vec<u8>,
}

impl TracingWriter {
    fn emit(&self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');
        match self.level {
            Level::ERROR => tracing::error!(target: "logvisor::display", "{line}"),
            Level::WARN => tracing::warn!(target: "logvisor::display", "{line}"),
            Level::INFO => tracing::info!(target: "logvisor::display", "{line}"),
            Level::DEBUG => tracing::debug!(target: "logvisor::display", "{line}"),
            _ => tracing::trace!(target: "logvisor::display", "{line}"),
        }
    }
}

impl Write for TracingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for TracingWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
