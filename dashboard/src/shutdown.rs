//! Graceful shutdown handling
//!
//! Ctrl+C sets a shared flag; the TUI loop checks it alongside its own quit
//! key so the terminal is always restored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;

/// Shared shutdown signal.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Run shutdown handler in background.
/// Returns a ShutdownSignal that will be triggered on Ctrl+C.
pub fn spawn_shutdown_handler() -> ShutdownSignal {
    let signal_out = ShutdownSignal::new();
    let signal_task = signal_out.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => signal_task.shutdown(),
            Err(e) => {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
        }
    });

    signal_out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_signal() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());

        signal.shutdown();
        assert!(signal.is_shutdown());
    }
}
