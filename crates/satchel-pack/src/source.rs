use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;

/// Supplies file bytes for self-owned entries at encode time.
///
/// `open` must yield exactly the byte stream the entry was scanned from;
/// the encoder enforces the recorded size and fails on any mismatch.
pub trait ContentSource {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Reads content from files under a root directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for DirSource {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = std::fs::File::open(self.root.join(path))?;
        Ok(Box::new(file))
    }
}

/// In-memory content source for tests and embedding.
#[derive(Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ContentSource for MemorySource {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        match self.files.get(path) {
            Some(content) => Ok(Box::new(content.as_slice())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such entry: {path}"),
            )),
        }
    }
}
