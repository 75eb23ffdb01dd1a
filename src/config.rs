//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the log manager.
//!
//! ## Sentinel values
//! - `copy_buffer = 0` → clamped to 1 byte
//! - `bus_capacity = 0` → clamped to 1 event
//! - `grace = 0s` → shutdown does not wait for tasks at all

use std::time::Duration;

use tracing::Level;

use crate::sources::Backend;

/// Prefix printed by `docker-compose logs` before any service output.
pub const COMPOSE_ATTACH_BANNER: &[u8] = b"Attaching to ";

/// Global configuration for the log manager.
///
/// ## Field semantics
/// - `backend`: Which kind of source is reconciled; others are ignored
/// - `noise_prefixes`: Chunks starting with any of these are dropped by both writers
/// - `display_level`: Level requested from the display sink
/// - `copy_buffer`: Read buffer size per streaming task
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `grace`: Maximum wait for tasks to exit during shutdown
#[derive(Clone, Debug)]
pub struct Config {
    /// Backend whose sources are considered desired.
    pub backend: Backend,

    /// Known noise prefixes (connection banners and the like).
    pub noise_prefixes: Vec<Vec<u8>>,

    /// Level passed to [`DisplaySink::writer`](crate::DisplaySink::writer).
    pub display_level: Level,

    /// Size of the buffer each streaming task reads into.
    pub copy_buffer: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Maximum time to wait for streaming tasks to exit on shutdown.
    pub grace: Duration,
}

impl Config {
    /// Returns the copy buffer size clamped to a minimum of 1.
    #[inline]
    pub fn copy_buffer_clamped(&self) -> usize {
        self.copy_buffer.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `backend = Backend::Compose`
    /// - `noise_prefixes = ["Attaching to "]`
    /// - `display_level = INFO`
    /// - `copy_buffer = 8 KiB`
    /// - `bus_capacity = 1024`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            backend: Backend::Compose,
            noise_prefixes: vec![COMPOSE_ATTACH_BANNER.to_vec()],
            display_level: Level::INFO,
            copy_buffer: 8 * 1024,
            bus_capacity: 1024,
            grace: Duration::from_secs(10),
        }
    }
}
