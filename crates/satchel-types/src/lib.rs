//! Foundation types for satchel.
//!
//! Everything in a satchel store is addressed by a [`Digest`]: file content
//! by its content digest, whole snapshots by the digest of their canonical
//! manifest. [`SnapshotId`] is the digest of a snapshot's canonical manifest
//! sequence and doubles as the on-disk package filename.
//!
//! [`FileRecord`] is what a directory scan produces; [`ManifestEntry`] is a
//! record annotated with the snapshot that physically owns its bytes.

pub mod digest;
pub mod error;
pub mod record;

pub use digest::{Digest, SnapshotId};
pub use error::TypeError;
pub use record::{FileRecord, ManifestEntry};
