//! On-disk package format for satchel.
//!
//! One package file per snapshot, named by its hex snapshot id:
//!
//! ```text
//! [8-byte big-endian u64: manifest_length]
//! [manifest_length bytes: UTF-8, one line per entry]
//!   line = path '\t' digest_hex '\t' size_decimal '\t' owner '\n'
//!   owner is the literal token "SELF" when the entry's bytes live in this
//!   package, otherwise the owning snapshot's 64-char hex id
//! [content segment: raw bytes of each distinct self-owned digest, first
//!   manifest occurrence first, exactly `size` bytes each, no delimiters]
//! ```
//!
//! The explicit length prefix and delimiter-free segment make the format
//! unambiguous: no sentinel bytes to scan for, no persisted offsets that
//! could drift out of step with entry ordering.

pub mod error;
pub mod reader;
pub mod source;
pub mod writer;

pub use error::{PackError, PackResult};
pub use reader::Package;
pub use source::{ContentSource, DirSource, MemorySource};
pub use writer::PackageWriter;

/// Owner token for entries whose bytes live in the package being written.
/// Kept symbolic rather than repeating the id, so package bytes are
/// independent of the filename they are stored under.
pub const SELF_OWNER_TOKEN: &str = "SELF";

/// Width of the big-endian manifest length prefix.
pub const MANIFEST_LEN_WIDTH: usize = 8;

#[cfg(test)]
mod tests {
    use satchel_hash::ContentHasher;
    use satchel_types::{Digest, FileRecord, ManifestEntry, SnapshotId};

    use super::*;

    fn entry(path: &str, content: &[u8], owner: SnapshotId) -> ManifestEntry {
        ManifestEntry::new(
            FileRecord::new(path, ContentHasher::FILE.hash(content), content.len() as u64),
            owner,
        )
    }

    fn own_id() -> SnapshotId {
        Digest::from_bytes(b"the package under test")
    }

    #[test]
    fn encode_decode_roundtrip() {
        let id = own_id();
        let entries = vec![entry("a.txt", b"alpha", id), entry("b/c.txt", b"gamma", id)];
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);
        source.insert("b/c.txt", &b"gamma"[..]);

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        let package = Package::decode(id, &bytes).unwrap();

        assert_eq!(package.entries(), entries.as_slice());
        assert_eq!(package.content_for(&entries[0]).unwrap(), b"alpha");
        assert_eq!(package.content_for(&entries[1]).unwrap(), b"gamma");
    }

    #[test]
    fn foreign_owned_entries_carry_no_content() {
        let id = own_id();
        let elsewhere = Digest::from_bytes(b"an earlier snapshot");
        let entries = vec![
            entry("new.txt", b"fresh bytes", id),
            entry("old.txt", b"unchanged", elsewhere),
        ];
        let mut source = MemorySource::new();
        source.insert("new.txt", &b"fresh bytes"[..]);
        // No bytes registered for old.txt: the encoder must not ask for them.

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        let package = Package::decode(id, &bytes).unwrap();

        assert_eq!(package.content_for(&entries[0]).unwrap(), b"fresh bytes");
        let err = package.content_for(&entries[1]).unwrap_err();
        assert!(matches!(err, PackError::MissingContent { .. }));
    }

    #[test]
    fn intra_package_duplicate_digest_stored_once() {
        let id = own_id();
        let entries = vec![entry("a.txt", b"hello", id), entry("b/c.txt", b"hello", id)];
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"hello"[..]);
        source.insert("b/c.txt", &b"hello"[..]);

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();

        // One 5-byte run, not two.
        let manifest_len = u64::from_be_bytes(bytes[..8].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), 8 + manifest_len + 5);

        let package = Package::decode(id, &bytes).unwrap();
        assert_eq!(package.content_for(&entries[0]).unwrap(), b"hello");
        assert_eq!(package.content_for(&entries[1]).unwrap(), b"hello");
    }

    #[test]
    fn self_token_keeps_bytes_filename_independent() {
        let id = own_id();
        let entries = vec![entry("a.txt", b"alpha", id)];
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        let text = std::str::from_utf8(&bytes[8..]).unwrap();
        assert!(text.contains("\tSELF\n"));
        assert!(!text.contains(&id.to_hex()));
    }

    #[test]
    fn content_resembling_manifest_lines_is_inert() {
        // The length prefix means manifest-looking content can't truncate
        // or extend the parsed manifest.
        let id = own_id();
        let tricky = b"x.txt\tdeadbeef\t9\tSELF\n\n";
        let entries = vec![entry("t.txt", tricky, id)];
        let mut source = MemorySource::new();
        source.insert("t.txt", &tricky[..]);

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        let package = Package::decode(id, &bytes).unwrap();
        assert_eq!(package.entries().len(), 1);
        assert_eq!(package.content_for(&entries[0]).unwrap(), &tricky[..]);
    }

    #[test]
    fn encode_rejects_short_provider() {
        let id = own_id();
        let mut e = entry("a.txt", b"alpha", id);
        e.size = 10; // scanner said 10 bytes, provider has 5
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);

        let err = PackageWriter::encode(&id, &[e], &source).unwrap_err();
        assert!(matches!(
            err,
            PackError::SizeMismatch {
                expected: 10,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn encode_rejects_long_provider() {
        let id = own_id();
        let mut e = entry("a.txt", b"alpha", id);
        e.size = 3;
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);

        let err = PackageWriter::encode(&id, &[e], &source).unwrap_err();
        assert!(matches!(err, PackError::SizeMismatch { expected: 3, .. }));
    }

    #[test]
    fn decode_rejects_truncated_prefix() {
        let err = Package::decode(own_id(), &[0, 0, 1]).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_manifest_length_overrun() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1000u64.to_be_bytes());
        bytes.extend_from_slice(b"short");
        let err = Package::decode(own_id(), &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_bad_field_count() {
        let manifest = b"a.txt\tonly-two-fields\n";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(manifest.len() as u64).to_be_bytes());
        bytes.extend_from_slice(manifest);
        let err = Package::decode(own_id(), &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_non_numeric_size() {
        let digest = ContentHasher::FILE.hash(b"x").to_hex();
        let manifest = format!("a.txt\t{digest}\tfive\tSELF\n");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(manifest.len() as u64).to_be_bytes());
        bytes.extend_from_slice(manifest.as_bytes());
        let err = Package::decode(own_id(), &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_overflowing_size() {
        // A hostile manifest whose second entry declares u64::MAX bytes must
        // come back as a malformed package, not an arithmetic panic.
        let d1 = ContentHasher::FILE.hash(b"hello").to_hex();
        let d2 = ContentHasher::FILE.hash(b"other").to_hex();
        let manifest = format!("a.txt\t{d1}\t5\tSELF\nb.txt\t{d2}\t{}\tSELF\n", u64::MAX);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(manifest.len() as u64).to_be_bytes());
        bytes.extend_from_slice(manifest.as_bytes());
        bytes.extend_from_slice(b"hello");
        let err = Package::decode(own_id(), &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn encode_rejects_overflowing_size() {
        let id = own_id();
        let mut e = entry("a.txt", b"alpha", id);
        e.size = u64::MAX;
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);

        let err = PackageWriter::encode(&id, &[e], &source).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_truncated_content_segment() {
        let digest = ContentHasher::FILE.hash(b"hello").to_hex();
        let manifest = format!("a.txt\t{digest}\t5\tSELF\n");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(manifest.len() as u64).to_be_bytes());
        bytes.extend_from_slice(manifest.as_bytes());
        bytes.extend_from_slice(b"hel"); // 3 of 5 bytes
        let err = Package::decode(own_id(), &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn decode_rejects_trailing_content() {
        let id = own_id();
        let entries = vec![entry("a.txt", b"alpha", id)];
        let mut source = MemorySource::new();
        source.insert("a.txt", &b"alpha"[..]);
        let mut bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        bytes.extend_from_slice(b"junk");
        let err = Package::decode(id, &bytes).unwrap_err();
        assert!(matches!(err, PackError::Malformed { .. }));
    }

    #[test]
    fn empty_package_roundtrip() {
        let id = own_id();
        let source = MemorySource::new();
        let bytes = PackageWriter::encode(&id, &[], &source).unwrap();
        let package = Package::decode(id, &bytes).unwrap();
        assert!(package.entries().is_empty());
    }

    #[test]
    fn dir_source_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/f.txt"), b"from disk").unwrap();

        let id = own_id();
        let entries = vec![entry("sub/f.txt", b"from disk", id)];
        let source = DirSource::new(dir.path());

        let bytes = PackageWriter::encode(&id, &entries, &source).unwrap();
        let package = Package::decode(id, &bytes).unwrap();
        assert_eq!(package.content_for(&entries[0]).unwrap(), b"from disk");
    }
}
