use std::io::{self, Write};
use std::sync::Arc;

use super::filter::LogFilter;
use crate::sources::{Dispatch, LogAction, SourceName};

/// Dispatches unfiltered chunks as [`LogAction`]s tagged with the source name.
///
/// The chunk is copied before dispatch since the caller reuses its buffer.
/// Always reports the full chunk length as written.
pub struct ActionWriter<D: ?Sized> {
    dispatcher: Arc<D>,
    source: SourceName,
    filter: LogFilter,
}

impl<D: Dispatch + ?Sized> ActionWriter<D> {
    pub fn new(dispatcher: Arc<D>, source: SourceName, filter: LogFilter) -> Self {
        Self {
            dispatcher,
            source,
            filter,
        }
    }
}

impl<D: Dispatch + ?Sized> Write for ActionWriter<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.filter.should_filter(buf) {
            return Ok(buf.len());
        }
        self.dispatcher.dispatch(LogAction {
            source: self.source.clone(),
            log: Arc::from(buf),
        });
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
