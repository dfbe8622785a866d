use satchel_hash::ContentHasher;
use satchel_types::{FileRecord, SnapshotId};

use crate::error::{ManifestError, ManifestResult};

/// A canonical manifest: sorted records plus the snapshot id derived from
/// them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    /// Identity of this tree state.
    pub id: SnapshotId,
    /// Records in byte-wise ascending path order.
    pub records: Vec<FileRecord>,
}

impl Manifest {
    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the manifest tracks no files.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds canonical manifests from raw scan results.
pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Canonicalize scan records and derive the snapshot id.
    ///
    /// Records are sorted by byte-wise path order; a repeated path is a
    /// [`ManifestError::DuplicatePath`]. The id is computed over the
    /// canonical sequence and is therefore independent of enumeration order.
    pub fn build(mut records: Vec<FileRecord>) -> ManifestResult<Manifest> {
        records.sort();

        for pair in records.windows(2) {
            if pair[0].path == pair[1].path {
                return Err(ManifestError::DuplicatePath(pair[0].path.clone()));
            }
        }

        let id = Self::derive_id(&records);
        Ok(Manifest { id, records })
    }

    /// The canonical byte sequence: one tab-separated line per sorted
    /// record, newline-terminated. Recomputed identically at verification
    /// time; never persisted as-is.
    pub fn canonical_bytes(records: &[FileRecord]) -> Vec<u8> {
        let mut buf = Vec::new();
        for record in records {
            buf.extend_from_slice(record.path.as_bytes());
            buf.push(b'\t');
            buf.extend_from_slice(record.digest.to_hex().as_bytes());
            buf.push(b'\t');
            buf.extend_from_slice(record.size.to_string().as_bytes());
            buf.push(b'\n');
        }
        buf
    }

    fn derive_id(records: &[FileRecord]) -> SnapshotId {
        ContentHasher::SNAPSHOT.hash(&Self::canonical_bytes(records))
    }
}
