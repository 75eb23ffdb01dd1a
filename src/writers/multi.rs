use std::io::{self, Write};

/// Writes every chunk to each inner writer in order.
///
/// The first failing writer aborts the write; writers after it do not see the chunk.
pub struct MultiWriter {
    writers: Vec<Box<dyn Write + Send>>,
}

impl MultiWriter {
    pub fn new(writers: Vec<Box<dyn Write + Send>>) -> Self {
        Self { writers }
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for w in &mut self.writers {
            w.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for w in &mut self.writers {
            w.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fans_out_to_all() {
        let a = Shared::default();
        let b = Shared::default();
        let writers: Vec<Box<dyn Write + Send>> = vec![Box::new(a.clone()), Box::new(b.clone())];
        let mut m = MultiWriter::new(writers);
        assert_eq!(m.write(b"line\n").unwrap(), 5);
        assert_eq!(*a.0.lock().unwrap(), b"line\n");
        assert_eq!(*b.0.lock().unwrap(), b"line\n");
    }

    #[test]
    fn test_first_error_stops_fan_out() {
        let after = Shared::default();
        let writers: Vec<Box<dyn Write + Send>> = vec![Box::new(Broken), Box::new(after.clone())];
        let mut m = MultiWriter::new(writers);
        let err = m.write(b"line\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(after.0.lock().unwrap().is_empty());
    }
}
