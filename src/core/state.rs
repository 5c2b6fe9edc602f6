//! Shutdown state shared by the accept loops, the watcher and Ctrl+C.
//!
//! The signal handler runs on its own thread, so the flag it raises is
//! handed to it once at startup. Every loop receives a clone of the same
//! [`Shutdown`] handle instead of reading a global.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable shutdown flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` if it was already raised.
    pub fn trigger(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    /// Check if shutdown has been requested
    ///
    /// Relaxed is enough: a loop that misses the store polls again shortly.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Setup the Ctrl+C handler. Call once at program start
///
/// The first signal only raises the flag; the accept loops notice it on
/// their next poll and the normal shutdown sequence runs. A second signal
/// while that sequence is still in progress exits immediately.
pub fn setup_shutdown_handler(shutdown: Shutdown) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if shutdown.trigger() {
            crate::log!("serve"; "forced exit");
            std::process::exit(130);
        }
        crate::log!("serve"; "shutting down...");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
