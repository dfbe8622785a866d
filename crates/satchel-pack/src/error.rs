use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// The package bytes fail to parse: bad field count, non-numeric size,
    /// invalid digest, unknown owner token, or a manifest length that
    /// overruns the file.
    #[error("malformed package: {reason}")]
    Malformed { reason: String },

    /// A content provider yielded a different number of bytes than the
    /// entry's recorded size.
    #[error("size mismatch for {path}: manifest says {expected} bytes, provider yielded {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// The requested entry's bytes are not stored in this package.
    #[error("no content for {path} in this package (owned elsewhere)")]
    MissingContent { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
