use std::io::{self, Write};

use super::filter::LogFilter;

/// Forwards unfiltered chunks verbatim to the display sink.
///
/// Always reports the full chunk length as written.
pub struct GlobalLogWriter<W> {
    writer: W,
    filter: LogFilter,
}

impl<W: Write> GlobalLogWriter<W> {
    pub fn new(writer: W, filter: LogFilter) -> Self {
        Self { writer, filter }
    }
}

impl<W: Write> Write for GlobalLogWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.filter.should_filter(buf) {
            return Ok(buf.len());
        }
        self.writer.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_chunk_not_forwarded() {
        let mut w = GlobalLogWriter::new(Vec::new(), LogFilter::default());
        let chunk = b"Attaching to app_web_1\n";
        assert_eq!(w.write(chunk).unwrap(), chunk.len());
        assert!(w.writer.is_empty());
    }

    #[test]
    fn test_chunk_forwarded_verbatim() {
        let mut w = GlobalLogWriter::new(Vec::new(), LogFilter::default());
        let chunk = b"web_1  | listening on :8080\n";
        assert_eq!(w.write(chunk).unwrap(), chunk.len());
        assert_eq!(w.writer, chunk);
    }
}
