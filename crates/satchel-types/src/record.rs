use serde::{Deserialize, Serialize};

use crate::digest::{Digest, SnapshotId};

/// One scanned file: normalized relative path, content digest, byte count.
///
/// Paths are forward-slash separated with no leading `./`. Records are
/// produced fresh on every scan and never persisted directly; the persisted
/// form is [`ManifestEntry`], which adds the owning snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub digest: Digest,
    pub size: u64,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, digest: Digest, size: u64) -> Self {
        Self {
            path: path.into(),
            digest,
            size,
        }
    }
}

impl PartialOrd for FileRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Byte-wise path order; this is the canonical manifest order.
        self.path.as_bytes().cmp(other.path.as_bytes())
    }
}

/// A manifest line: a [`FileRecord`] plus the snapshot whose package
/// physically stores the bytes.
///
/// `owner` may equal the snapshot the entry belongs to (self-owned, bytes
/// live in this package's content segment) or an earlier snapshot that
/// already introduced the same digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub digest: Digest,
    pub size: u64,
    pub owner: SnapshotId,
}

impl ManifestEntry {
    pub fn new(record: FileRecord, owner: SnapshotId) -> Self {
        Self {
            path: record.path,
            digest: record.digest,
            size: record.size,
            owner,
        }
    }

    /// Whether this entry's bytes live in the package identified by `id`.
    pub fn is_owned_by(&self, id: &SnapshotId) -> bool {
        self.owner == *id
    }
}
