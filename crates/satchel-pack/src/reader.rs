use std::collections::HashMap;

use satchel_types::{Digest, ManifestEntry, SnapshotId};

use crate::error::{PackError, PackResult};
use crate::{MANIFEST_LEN_WIDTH, SELF_OWNER_TOKEN};

/// A decoded package: parsed manifest plus addressable content runs.
///
/// Runs are not independently addressable on disk; their offsets are
/// recomputed here by replaying sequential consumption over the package's
/// full self-owned entry order, one run per distinct digest.
#[derive(Debug)]
pub struct Package {
    id: SnapshotId,
    entries: Vec<ManifestEntry>,
    content: Vec<u8>,
    runs: HashMap<Digest, (usize, usize)>,
}

impl Package {
    /// Decode a package from its raw bytes.
    ///
    /// `own_id` is supplied by the caller (the id is the filename, not
    /// embedded in the bytes); `SELF` owner tokens resolve to it.
    pub fn decode(own_id: SnapshotId, bytes: &[u8]) -> PackResult<Self> {
        let Some((prefix, rest)) = bytes.split_first_chunk::<MANIFEST_LEN_WIDTH>() else {
            return Err(PackError::malformed("shorter than the manifest length prefix"));
        };
        let manifest_len = u64::from_be_bytes(*prefix);
        if manifest_len > rest.len() as u64 {
            return Err(PackError::malformed(format!(
                "manifest length {manifest_len} overruns file ({} bytes remain)",
                rest.len()
            )));
        }
        let (manifest, content) = rest.split_at(manifest_len as usize);

        let manifest = std::str::from_utf8(manifest)
            .map_err(|e| PackError::malformed(format!("manifest is not UTF-8: {e}")))?;

        let mut entries = Vec::new();
        for line in manifest.lines() {
            entries.push(parse_line(&own_id, line)?);
        }

        let runs = replay_runs(&own_id, &entries, content.len())?;
        tracing::debug!(
            id = %own_id.short_hex(),
            entries = entries.len(),
            runs = runs.len(),
            "package decoded"
        );

        Ok(Self {
            id: own_id,
            entries,
            content: content.to_vec(),
            runs,
        })
    }

    /// The snapshot id this package was stored under.
    pub fn id(&self) -> &SnapshotId {
        &self.id
    }

    /// The full manifest, in stored order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Consume the package, keeping only the manifest.
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    /// Bytes for a manifest entry whose owner is this package.
    ///
    /// Fails with [`PackError::MissingContent`] if the entry's digest has no
    /// run here (its bytes live in a different package).
    pub fn content_for(&self, entry: &ManifestEntry) -> PackResult<&[u8]> {
        self.content_by_digest(&entry.digest)
            .ok_or_else(|| PackError::MissingContent {
                path: entry.path.clone(),
            })
    }

    /// Bytes for a digest stored in this package's content segment.
    pub fn content_by_digest(&self, digest: &Digest) -> Option<&[u8]> {
        let &(offset, len) = self.runs.get(digest)?;
        Some(&self.content[offset..offset + len])
    }
}

fn parse_line(own_id: &SnapshotId, line: &str) -> PackResult<ManifestEntry> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [path, digest, size, owner] = fields.as_slice() else {
        return Err(PackError::malformed(format!(
            "expected 4 tab-separated fields, got {}: {line:?}",
            fields.len()
        )));
    };

    let digest = Digest::from_hex(digest)
        .map_err(|e| PackError::malformed(format!("bad digest for {path}: {e}")))?;
    let size: u64 = size
        .parse()
        .map_err(|_| PackError::malformed(format!("non-numeric size for {path}: {size:?}")))?;
    let owner = if *owner == SELF_OWNER_TOKEN {
        *own_id
    } else {
        SnapshotId::from_hex(owner)
            .map_err(|e| PackError::malformed(format!("bad owner for {path}: {e}")))?
    };

    Ok(ManifestEntry {
        path: (*path).to_string(),
        digest,
        size,
        owner,
    })
}

/// Replay sequential consumption over self-owned entries to recover each
/// distinct digest's `(offset, len)` within the content segment.
fn replay_runs(
    own_id: &SnapshotId,
    entries: &[ManifestEntry],
    content_len: usize,
) -> PackResult<HashMap<Digest, (usize, usize)>> {
    let mut runs = HashMap::new();
    let mut cursor = 0usize;
    for entry in entries {
        if !entry.is_owned_by(own_id) || runs.contains_key(&entry.digest) {
            continue;
        }
        // Sizes come from the untrusted manifest; a hostile value must not
        // overflow the cursor.
        let end = usize::try_from(entry.size)
            .ok()
            .and_then(|len| cursor.checked_add(len))
            .ok_or_else(|| {
                PackError::malformed(format!(
                    "entry size {} for {} overflows the content segment",
                    entry.size, entry.path
                ))
            })?;
        if end > content_len {
            return Err(PackError::malformed(format!(
                "content segment truncated: {} needs bytes {cursor}..{end} of {content_len}",
                entry.path
            )));
        }
        runs.insert(entry.digest, (cursor, end - cursor));
        cursor = end;
    }
    if cursor != content_len {
        return Err(PackError::malformed(format!(
            "content segment has {} trailing bytes",
            content_len - cursor
        )));
    }
    Ok(runs)
}
