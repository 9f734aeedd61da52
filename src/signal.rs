//! Termination-signal handling.
//!
//! Flag-based: SIGINT/SIGTERM/SIGQUIT set a shared flag the run loop polls
//! each tick, so terminal restoration runs on the normal exit path. A second
//! signal while the flag is already set force-quits with code 1.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;

/// Register the termination signals and return the shutdown flag.
pub fn setup_shutdown_flag() -> Result<Arc<AtomicBool>, std::io::Error> {
    let term_now = Arc::new(AtomicBool::new(false));
    for sig in TERM_SIGNALS {
        // Conditional shutdown first: it only fires when the flag is
        // already set, giving force-quit on the second signal.
        flag::register_conditional_shutdown(*sig, 1, Arc::clone(&term_now))?;
        flag::register(*sig, Arc::clone(&term_now))?;
    }
    Ok(term_now)
}
