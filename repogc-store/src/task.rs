use crate::error::GcError;

/// Ambient cancellation/logging context threaded through every blocking core operation.
///
/// Kept as its own small trait rather than a dependency on a REST-server task-tracking context,
/// which this crate has no use for. `check_abort` is polled between mark batches and between
/// repair marks, never in the middle of a flip/publish sequence.
pub trait GcWorker {
    /// Returns `Err(GcError::Cancelled)` if the ambient cancellation signal has fired.
    fn check_abort(&self) -> Result<(), GcError>;

    /// Emit a log line at the given level, tagged with the worker's identity.
    fn log(&self, level: log::Level, message: &std::fmt::Arguments);
}

/// Convenience passthrough so driver code can take `&dyn GcWorker` or an `Arc<impl GcWorker>`
/// interchangeably.
impl<T: GcWorker + ?Sized> GcWorker for std::sync::Arc<T> {
    fn check_abort(&self) -> Result<(), GcError> {
        <T as GcWorker>::check_abort(self)
    }

    fn log(&self, level: log::Level, message: &std::fmt::Arguments) {
        <T as GcWorker>::log(self, level, message)
    }
}

#[macro_export]
macro_rules! gc_log {
    ($worker:expr, $lvl:expr, $($fmt:tt)+) => {{
        $crate::task::GcWorker::log($worker, $lvl, &format_args!($($fmt)+));
    }};
}

#[macro_export]
macro_rules! gc_info {
    ($worker:expr, $($fmt:tt)+) => {
        $crate::gc_log!($worker, log::Level::Info, $($fmt)+)
    };
}

#[macro_export]
macro_rules! gc_warn {
    ($worker:expr, $($fmt:tt)+) => {
        $crate::gc_log!($worker, log::Level::Warn, $($fmt)+)
    };
}

/// A `GcWorker` with no cancellation source and plain `log`-crate output. Used by tests and by
/// one-shot CLI invocations that don't need cooperative cancellation wiring.
#[derive(Clone, Copy, Default)]
pub struct NullWorker;

impl GcWorker for NullWorker {
    fn check_abort(&self) -> Result<(), GcError> {
        Ok(())
    }

    fn log(&self, level: log::Level, message: &std::fmt::Arguments) {
        log::log!(level, "{}", message);
    }
}
