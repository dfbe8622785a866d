use satchel_types::SnapshotId;
use thiserror::Error;

/// Errors from snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested snapshot has no package in the store.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// An existing package under this id holds a different manifest.
    /// Indicates a digest collision or a bug; never resolved by overwriting.
    #[error("store inconsistency: package {id} exists with a different manifest")]
    Consistency { id: SnapshotId },

    /// A package file failed to parse. Other packages remain usable.
    #[error("package {id}: {source}")]
    Pack {
        id: SnapshotId,
        #[source]
        source: satchel_pack::PackError,
    },

    /// A file in the store directory is not named by a hex snapshot id.
    #[error("unrecognized file in store directory: {0}")]
    ForeignFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
