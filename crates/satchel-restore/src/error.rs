use satchel_types::Digest;
use thiserror::Error;

/// Errors from restore operations.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Extracted bytes do not hash to the manifest's recorded digest.
    /// Aborts the restore immediately; wrong bytes are never written.
    #[error("integrity failure for {path}: expected {expected}, computed {computed}")]
    Integrity {
        path: String,
        expected: Digest,
        computed: Digest,
    },

    #[error(transparent)]
    Store(#[from] satchel_store::StoreError),

    #[error(transparent)]
    Pack(#[from] satchel_pack::PackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for restore operations.
pub type RestoreResult<T> = Result<T, RestoreError>;
