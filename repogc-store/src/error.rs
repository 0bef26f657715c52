use thiserror::Error;

/// Error taxonomy surfaced by the GC core.
///
/// A lower-level store can get by with a single opaque error type because nothing downstream
/// needs to distinguish error *kinds* — every error is simply fatal for the caller. This core
/// needs the distinction: callers dispatch on kind (swallow `NotFound` in delete paths, swallow a
/// lost cache race, retry `TransientIo`, abort on `Integrity`/`Cancelled`), so it earns a typed
/// enum.
#[derive(Debug, Error)]
pub enum GcError {
    /// Blob, content, or manifest absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Atomic cache rename failed but a concurrent writer produced the same file first.
    #[error("cache race lost for {0}, peer already wrote it")]
    CacheRaceLost(String),

    /// Atomic cache rename failed and no peer produced the file either.
    #[error("cache write lost for {0}: {1}")]
    CacheWriteFailed(String, #[source] anyhow::Error),

    /// Timeout, 5xx, or other transient I/O condition. Retried with backoff by the blob layer;
    /// surfaced here only once backoff is exhausted.
    #[error("transient I/O error: {0}")]
    TransientIo(#[source] anyhow::Error),

    /// Data corruption or a broken invariant (short read, manifest pointing at a missing
    /// mark-details content, malformed index blob, ...). Fatal for the current unit of work.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The ambient cancellation signal fired.
    #[error("cancelled")]
    Cancelled,

    /// Any other I/O failure not covered above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GcError {
    pub fn not_found(what: impl Into<String>) -> Self {
        GcError::NotFound(what.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        GcError::Integrity(msg.into())
    }

    /// True for the handful of kinds that allow local recovery.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GcError::TransientIo(_))
    }

    /// True when the error means "the thing we wanted gone is already gone" — treated as success
    /// in delete/undelete paths.
    pub fn is_benign_not_found(&self) -> bool {
        matches!(self, GcError::NotFound(_))
    }
}

pub type GcResult<T> = Result<T, GcError>;
