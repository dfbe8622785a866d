//! Snapshot materialization.
//!
//! A snapshot's manifest may reference bytes spread over many packages (one
//! per owner). The engine decodes each owning package once, extracts the
//! entries it serves, verifies every extracted run against its recorded
//! digest, and writes the tree under the destination directory.

pub mod engine;
pub mod error;

pub use engine::{RestoreEngine, RestoreMode, RestoreReport};
pub use error::{RestoreError, RestoreResult};
