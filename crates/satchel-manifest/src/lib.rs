//! Canonical manifest construction and snapshot identity.
//!
//! Directory enumeration order is not stable across platforms or
//! invocations, so the builder sorts scan records by byte-wise path order
//! before deriving the snapshot id. The id is the snapshot-domain digest of
//! the canonical sequence of `(path, digest, size)` lines -- ownership never
//! participates, so identity is a pure function of logical content, never of
//! physical storage layout.

pub mod builder;
pub mod error;

pub use builder::{Manifest, ManifestBuilder};
pub use error::{ManifestError, ManifestResult};
