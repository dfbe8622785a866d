use std::collections::HashSet;
use std::io::Read;

use satchel_types::{Digest, ManifestEntry, SnapshotId};
use tracing::debug;

use crate::error::{PackError, PackResult};
use crate::source::ContentSource;
use crate::SELF_OWNER_TOKEN;

/// Serializes one package: length-prefixed manifest followed by the content
/// segment.
///
/// The manifest length prefix replaces sentinel-marker scanning: the
/// boundary between manifest and content is explicit, so content bytes that
/// happen to look like manifest lines can never confuse a reader. The
/// content segment carries no delimiters and no persisted offsets; entries
/// are delimited by sequential consumption in manifest order, since `size`
/// is already recorded per entry.
pub struct PackageWriter;

impl PackageWriter {
    /// Encode a package to bytes.
    ///
    /// `own_id` is the id of the snapshot being written; entries owned by it
    /// are serialized with the symbolic `SELF` token so the package bytes
    /// are independent of the filename they end up stored under. For each
    /// distinct self-owned digest (first manifest occurrence wins), the
    /// provider's bytes are appended to the content segment, enforcing
    /// exactly `size` bytes.
    pub fn encode(
        own_id: &SnapshotId,
        entries: &[ManifestEntry],
        source: &dyn ContentSource,
    ) -> PackResult<Vec<u8>> {
        let manifest = Self::manifest_bytes(own_id, entries);

        let mut buf = Vec::new();
        buf.extend_from_slice(&(manifest.len() as u64).to_be_bytes());
        buf.extend_from_slice(&manifest);

        let mut emitted: HashSet<Digest> = HashSet::new();
        for entry in entries {
            if !entry.is_owned_by(own_id) || !emitted.insert(entry.digest) {
                continue;
            }
            let reader = source.open(&entry.path)?;
            let written = append_exact(&mut buf, reader, entry.size)?;
            if written != entry.size {
                return Err(PackError::SizeMismatch {
                    path: entry.path.clone(),
                    expected: entry.size,
                    actual: written,
                });
            }
        }

        debug!(
            entries = entries.len(),
            runs = emitted.len(),
            bytes = buf.len(),
            "package encoded"
        );
        Ok(buf)
    }

    /// The manifest text: one tab-separated line per entry, newline
    /// terminated, self-owned entries carrying the `SELF` token.
    pub fn manifest_bytes(own_id: &SnapshotId, entries: &[ManifestEntry]) -> Vec<u8> {
        let mut buf = Vec::new();
        for entry in entries {
            buf.extend_from_slice(entry.path.as_bytes());
            buf.push(b'\t');
            buf.extend_from_slice(entry.digest.to_hex().as_bytes());
            buf.push(b'\t');
            buf.extend_from_slice(entry.size.to_string().as_bytes());
            buf.push(b'\t');
            if entry.is_owned_by(own_id) {
                buf.extend_from_slice(SELF_OWNER_TOKEN.as_bytes());
            } else {
                buf.extend_from_slice(entry.owner.to_hex().as_bytes());
            }
            buf.push(b'\n');
        }
        buf
    }
}

/// Copy at most `size + 1` bytes from `reader` into `buf`, returning how
/// many arrived. Reading one byte past `size` is how an over-long provider
/// is detected without draining it.
fn append_exact(buf: &mut Vec<u8>, reader: Box<dyn Read + '_>, size: u64) -> PackResult<u64> {
    let probe_limit = size.checked_add(1).ok_or_else(|| {
        PackError::malformed(format!("entry size {size} overflows the content segment"))
    })?;
    let before = buf.len() as u64;
    let mut limited = reader.take(probe_limit);
    limited.read_to_end(buf)?;
    let written = buf.len() as u64 - before;
    if written > size {
        // Drop the probe byte so a failed encode leaves no stray content.
        buf.truncate((before + size) as usize);
    }
    Ok(written)
}
