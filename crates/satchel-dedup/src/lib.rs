//! Ownership assignment for a snapshot being built.
//!
//! Dedup is by digest alone, independent of path: a renamed or copied file
//! with identical bytes deduplicates against the package that first
//! introduced those bytes. The stricter path-plus-digest variant would
//! forgo cross-rename dedup and is deliberately not implemented.

use std::collections::{HashMap, HashSet};

use satchel_store::{SnapshotStore, StoreResult};
use satchel_types::{Digest, FileRecord, ManifestEntry, SnapshotId};
use tracing::debug;

/// Mapping from content digest to the snapshot whose package physically
/// stores those bytes.
///
/// Built from every existing package's manifest in ascending snapshot-id
/// order; the first package to introduce a digest is authoritative when
/// several historical manifests reference the same content. Read-only once
/// built, so lookups are safe to run in any order.
#[derive(Debug, Default)]
pub struct DedupIndex {
    by_digest: HashMap<Digest, SnapshotId>,
}

impl DedupIndex {
    /// Build the index over the store's history, excluding the in-progress
    /// snapshot id (a half-built snapshot must never dedup against itself).
    pub fn build(store: &SnapshotStore, exclude: &HashSet<SnapshotId>) -> StoreResult<Self> {
        let mut by_digest = HashMap::new();
        for (id, entries) in store.load_all_manifests(exclude)? {
            for entry in entries {
                by_digest.entry(entry.digest).or_insert(entry.owner);
            }
            debug!(id = %id.short_hex(), digests = by_digest.len(), "indexed package");
        }
        Ok(Self { by_digest })
    }

    /// The snapshot owning this digest's bytes, if any package has them.
    pub fn owner_of(&self, digest: &Digest) -> Option<&SnapshotId> {
        self.by_digest.get(digest)
    }

    /// Number of distinct digests known to the store.
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    /// Returns `true` if no history was indexed.
    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}

/// Assigns each record of a new snapshot its owning package.
pub struct DedupResolver;

impl DedupResolver {
    /// Annotate sorted records with owners: the indexed snapshot when the
    /// digest already lives in the store, otherwise the snapshot being
    /// built (self-owned, bytes to be embedded in the new package).
    ///
    /// Two records in the same snapshot with equal digests both come out
    /// self-owned; the codec stores their bytes once.
    pub fn resolve(
        records: Vec<FileRecord>,
        new_id: &SnapshotId,
        index: &DedupIndex,
    ) -> Vec<ManifestEntry> {
        records
            .into_iter()
            .map(|record| {
                let owner = index.owner_of(&record.digest).copied().unwrap_or(*new_id);
                ManifestEntry::new(record, owner)
            })
            .collect()
    }

    /// Build the index (excluding `new_id`) and resolve in one step.
    pub fn resolve_against_store(
        store: &SnapshotStore,
        records: Vec<FileRecord>,
        new_id: &SnapshotId,
    ) -> StoreResult<Vec<ManifestEntry>> {
        let exclude: HashSet<SnapshotId> = [*new_id].into();
        let index = DedupIndex::build(store, &exclude)?;
        Ok(Self::resolve(records, new_id, &index))
    }
}
