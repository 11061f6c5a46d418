//! Signal handling for stopping a tail from the terminal.
//!
//! Uses `signal-hook::flag`: the first SIGINT/SIGTERM sets a flag so the
//! binary can stop its session and wait for the worker to exit, a second
//! one exits immediately with code 1.

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Set up signal handlers for graceful shutdown.
///
/// Returns an `Arc<AtomicBool>` that becomes `true` when a termination signal
/// (SIGINT, SIGTERM) is received.
pub fn setup_shutdown_handlers() -> Result<Arc<AtomicBool>, std::io::Error> {
    let term_now = Arc::new(AtomicBool::new(false));

    for sig in TERM_SIGNALS {
        // Only fires once term_now is already true
        flag::register_conditional_shutdown(*sig, 1, Arc::clone(&term_now))?;
        flag::register(*sig, Arc::clone(&term_now))?;
    }

    Ok(term_now)
}
