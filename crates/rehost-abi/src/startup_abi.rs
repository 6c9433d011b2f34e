//! Runtime start-up.
//!
//! Generated `main` calls [`start`] before the translated program body so
//! that process-wide state is fixed at a known point: the [`clock`] origin,
//! the logging configuration and the address space.
//!
//! [`clock`]: crate::time_abi::clock

use std::sync::atomic::{AtomicBool, Ordering};

use rehost_membrane::{config, global_space};

use crate::time_abi;

static STARTED: AtomicBool = AtomicBool::new(false);

/// Initialize the runtime. Calls after the first are no-ops.
pub fn start() {
    if STARTED.swap(true, Ordering::AcqRel) {
        return;
    }
    time_abi::pin_clock_start();
    let _ = config::log_threshold();
    let _ = global_space();
    trace_call!("startup", "start", { "pid": std::process::id() });
}

/// Whether [`start`] has run.
#[must_use]
pub fn started() -> bool {
    STARTED.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_idempotent() {
        start();
        assert!(started());
        let origin = time_abi::pin_clock_start();
        start();
        assert_eq!(time_abi::pin_clock_start(), origin);
    }
}
