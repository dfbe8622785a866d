use std::path::Path;

use anyhow::Context;
use satchel_hash::ContentHasher;
use satchel_store::STORE_DIR;
use satchel_types::FileRecord;

/// Recursively list the tree under `root` as scan records.
///
/// The reserved store directory is skipped wherever it appears. Paths are
/// normalized to forward-slash relative form; digests are streamed, not
/// buffered. Enumeration order is whatever the filesystem yields -- the
/// manifest builder canonicalizes it.
pub fn scan(root: &Path) -> anyhow::Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    for item in walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.file_name() != STORE_DIR)
    {
        let item = item?;
        if !item.file_type().is_file() {
            continue;
        }

        let rel = item.path().strip_prefix(root)?;
        let path = normalize(rel);

        let size = item.metadata()?.len();
        let file = std::fs::File::open(item.path())
            .with_context(|| format!("opening {path}"))?;
        let digest = ContentHasher::FILE
            .hash_reader(file)
            .with_context(|| format!("hashing {path}"))?;

        records.push(FileRecord::new(path, digest, size));
    }
    tracing::debug!(files = records.len(), root = %root.display(), "scan complete");
    Ok(records)
}

/// Forward-slash relative path, no leading `./`.
fn normalize(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
