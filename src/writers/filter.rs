//! # Noise filter.

use std::sync::Arc;

use crate::config::COMPOSE_ATTACH_BANNER;

/// Pure predicate deciding whether a chunk is noise.
///
/// A chunk is noise when it starts with one of the configured prefixes.
/// Cloning is cheap; the prefix list is shared.
#[derive(Debug, Clone)]
pub struct LogFilter {
    prefixes: Arc<[Vec<u8>]>,
}

impl LogFilter {
    pub fn new<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &Vec<u8>| !p.is_empty())
                .collect(),
        }
    }

    /// Returns `true` when `chunk` should be dropped.
    pub fn should_filter(&self, chunk: &[u8]) -> bool {
        self.prefixes.iter().any(|p| chunk.starts_with(p))
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new([COMPOSE_ATTACH_BANNER])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_is_filtered() {
        let f = LogFilter::default();
        assert!(f.should_filter(b"Attaching to app_web_1, app_db_1\n"));
    }

    #[test]
    fn test_other_chunks_pass() {
        let f = LogFilter::default();
        assert!(!f.should_filter(b"web_1  | Attaching to nothing\n"));
        assert!(!f.should_filter(b"Attaching"));
        assert!(!f.should_filter(b""));
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let f = LogFilter::new([&b""[..]]);
        assert!(!f.should_filter(b"anything"));
    }
}
