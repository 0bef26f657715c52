//! Standalone CLI realization of [`repogc_store::GcWorker`].
//!
//! Wires `GcWorker::check_abort` to a `SIGINT` handler, the way a one-shot CLI invocation is
//! expected to support Ctrl-C, and `GcWorker::log` straight through to the `log` crate, which
//! `env_logger` backs in `main.rs`.

use std::sync::atomic::{AtomicBool, Ordering};

use repogc_store::{GcError, GcWorker};

static CANCELLED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigint(_signum: libc::c_int) {
    CANCELLED.store(true, Ordering::SeqCst);
}

/// A [`GcWorker`] backed by a process-wide `SIGINT` flag. Only one is meaningful per process.
#[derive(Clone, Copy, Default)]
pub struct CliWorker;

impl CliWorker {
    /// Install the `SIGINT` handler. Call once, before any mark/repair invocation.
    pub fn install_sigint_handler() {
        unsafe {
            libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
        }
    }
}

impl GcWorker for CliWorker {
    fn check_abort(&self) -> Result<(), GcError> {
        if CANCELLED.load(Ordering::Relaxed) {
            Err(GcError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn log(&self, level: log::Level, message: &std::fmt::Arguments) {
        log::log!(level, "{}", message);
    }
}
