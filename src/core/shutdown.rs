//! # Termination signals for [`LogManager::run`](crate::LogManager::run).
//!
//! Unix: `SIGINT`, `SIGTERM` or `SIGQUIT`. Elsewhere: Ctrl-C.

use std::io;

/// Completes when the process is asked to terminate.
///
/// Returns `Err` if the signal handlers cannot be installed; the caller keeps
/// running without signal-driven shutdown in that case.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
        _ = quit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}
