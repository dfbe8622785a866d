use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use satchel_hash::ContentHasher;
use satchel_store::{SnapshotStore, STORE_DIR};
use satchel_types::{ManifestEntry, SnapshotId};
use tracing::debug;

use crate::error::{RestoreError, RestoreResult};

/// How a restore treats files already present in the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreMode {
    /// Full replacement: after all entries are written, files not in the
    /// manifest are deleted and emptied directories pruned.
    Clean,
    /// Extraneous files are left untouched.
    Merge,
}

/// Summary of a completed restore.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Manifest entries written.
    pub files_written: usize,
    /// Total content bytes written.
    pub bytes_written: u64,
    /// Extraneous files removed (clean mode only).
    pub files_removed: usize,
}

/// Materializes a snapshot into a directory by resolving each entry's owner
/// through the store.
///
/// No transactional rollback: a failure partway leaves the destination with
/// whichever files were already written.
pub struct RestoreEngine;

impl RestoreEngine {
    /// Restore `target` into `dest`.
    pub fn restore(
        store: &SnapshotStore,
        target: &SnapshotId,
        dest: &Path,
        mode: RestoreMode,
    ) -> RestoreResult<RestoreReport> {
        let entries = store.load_manifest(target)?;
        debug!(target = %target.short_hex(), entries = entries.len(), "restoring snapshot");

        // One decode per owning package, however many entries it serves.
        // Runs are only addressable through the owner's full self-owned
        // ordering, so the package is decoded whole either way.
        let mut by_owner: BTreeMap<SnapshotId, Vec<&ManifestEntry>> = BTreeMap::new();
        for entry in &entries {
            by_owner.entry(entry.owner).or_default().push(entry);
        }

        let mut report = RestoreReport::default();
        for (owner, group) in &by_owner {
            let package = store.load_package(owner)?;
            for entry in group {
                let bytes = package.content_for(entry)?;

                // Verify before writing: tampered content must never reach
                // the destination tree.
                let computed = ContentHasher::FILE.hash(bytes);
                if computed != entry.digest {
                    return Err(RestoreError::Integrity {
                        path: entry.path.clone(),
                        expected: entry.digest,
                        computed,
                    });
                }

                let path = dest.join(&entry.path);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, bytes)?;
                report.files_written += 1;
                report.bytes_written += entry.size;
            }
        }

        if mode == RestoreMode::Clean {
            report.files_removed = sweep_extraneous(dest, &entries)?;
        }

        Ok(report)
    }
}

/// Delete files under `dest` that are not in the manifest, then prune
/// directories the sweep emptied. The store directory is never touched.
fn sweep_extraneous(dest: &Path, entries: &[ManifestEntry]) -> RestoreResult<usize> {
    let keep: HashSet<&Path> = entries.iter().map(|e| Path::new(&e.path)).collect();

    let mut removed = 0;
    for item in walkdir::WalkDir::new(dest)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.file_name() != STORE_DIR)
    {
        let item = item.map_err(std::io::Error::from)?;
        if !item.file_type().is_file() {
            continue;
        }
        let rel = item
            .path()
            .strip_prefix(dest)
            .map_err(std::io::Error::other)?;
        if !keep.contains(rel) {
            debug!(path = %rel.display(), "removing extraneous file");
            std::fs::remove_file(item.path())?;
            removed += 1;
        }
    }

    prune_empty_dirs(dest)?;
    Ok(removed)
}

fn prune_empty_dirs(dest: &Path) -> RestoreResult<()> {
    for item in walkdir::WalkDir::new(dest)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| e.file_name() != STORE_DIR)
    {
        let item = item.map_err(std::io::Error::from)?;
        if item.file_type().is_dir() && std::fs::read_dir(item.path())?.next().is_none() {
            std::fs::remove_dir(item.path())?;
        }
    }
    Ok(())
}
