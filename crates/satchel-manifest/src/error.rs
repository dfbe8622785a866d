use thiserror::Error;

/// Errors from manifest construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    /// Two scan records share a normalized path. Indicates a scanner bug or
    /// a filesystem with case-only path collisions.
    #[error("duplicate path in scan results: {0}")]
    DuplicatePath(String),
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;
