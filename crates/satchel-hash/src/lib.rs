//! Domain-separated BLAKE3 content hashing.
//!
//! Each hasher carries a domain tag that is prepended to every hash
//! computation, so a file whose bytes happen to equal a canonical manifest
//! sequence can never collide with a snapshot id.

use std::io::{self, Read};

use satchel_types::Digest;

/// Buffer size for streaming hash computation.
const CHUNK_SIZE: usize = 64 * 1024;

/// Domain-separated BLAKE3 content hasher.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for file content.
    pub const FILE: Self = Self {
        domain: "satchel-file-v1",
    };
    /// Hasher for canonical manifest sequences (snapshot ids).
    pub const SNAPSHOT: Self = Self {
        domain: "satchel-snapshot-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = self.hasher();
        hasher.update(data);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a byte stream in fixed-size chunks without buffering it whole.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = self.hasher();
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Digest::from_hash(*hasher.finalize().as_bytes()))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    fn hasher(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ContentHasher::FILE.hash(data), ContentHasher::FILE.hash(data));
    }

    #[test]
    fn different_domains_produce_different_digests() {
        let data = b"same content";
        assert_ne!(
            ContentHasher::FILE.hash(data),
            ContentHasher::SNAPSHOT.hash(data)
        );
    }

    #[test]
    fn hash_reader_matches_hash() {
        let data = b"streamed content";
        let streamed = ContentHasher::FILE.hash_reader(&data[..]).unwrap();
        assert_eq!(streamed, ContentHasher::FILE.hash(data));
    }

    #[test]
    fn hash_reader_spans_chunk_boundary() {
        let data = vec![0xA5u8; CHUNK_SIZE * 2 + 17];
        let streamed = ContentHasher::FILE.hash_reader(data.as_slice()).unwrap();
        assert_eq!(streamed, ContentHasher::FILE.hash(&data));
    }

    #[test]
    fn hash_reader_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"on disk").unwrap();
        let opened = std::fs::File::open(file.path()).unwrap();
        let streamed = ContentHasher::FILE.hash_reader(opened).unwrap();
        assert_eq!(streamed, ContentHasher::FILE.hash(b"on disk"));
    }

    #[test]
    fn verify_correct_and_tampered() {
        let d = ContentHasher::FILE.hash(b"original");
        assert!(ContentHasher::FILE.verify(b"original", &d));
        assert!(!ContentHasher::FILE.verify(b"tampered", &d));
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::FILE.hash(b"data"));
    }
}
