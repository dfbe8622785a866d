//! Write-once package storage for satchel.
//!
//! The store is a reserved directory inside the scanned root holding one
//! immutable package file per snapshot, named by hex snapshot id.
//!
//! # Design Rules
//!
//! 1. Packages are write-once; an id is never overwritten.
//! 2. Re-creating an id with an identical manifest is an idempotent no-op;
//!    with a different manifest it is a fatal consistency error.
//! 3. Creates go through a temp file plus atomic rename, so the store never
//!    contains a half-written package, even across abrupt termination.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::SnapshotStore;

/// Name of the reserved store directory inside the scanned root. Excluded
/// from scanning and from clean-mode restore sweeps.
pub const STORE_DIR: &str = ".satchel";
