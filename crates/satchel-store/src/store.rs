use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use satchel_pack::{ContentSource, Package, PackageWriter};
use satchel_types::{ManifestEntry, SnapshotId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::STORE_DIR;

/// The on-disk collection of immutable snapshot packages.
///
/// One file per snapshot under the reserved store directory, named by the
/// hex snapshot id. Packages are write-once: recreating an existing id with
/// the same manifest is a no-op, with a different manifest a fatal
/// consistency error.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open (creating if needed) the store under `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join(STORE_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a package exists for `id`.
    pub fn contains(&self, id: &SnapshotId) -> bool {
        self.package_path(id).is_file()
    }

    /// Enumerate all package ids, ascending.
    pub fn list(&self) -> StoreResult<Vec<SnapshotId>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                // In-progress temp files from an atomic create.
                continue;
            }
            let id = SnapshotId::from_hex(&name)
                .map_err(|_| StoreError::ForeignFile(name.clone()))?;
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }

    /// Load and decode one package, content segment included.
    pub fn load_package(&self, id: &SnapshotId) -> StoreResult<Package> {
        let path = self.package_path(id);
        let bytes = std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::SnapshotNotFound(*id)
            } else {
                StoreError::Io(e)
            }
        })?;
        Package::decode(*id, &bytes).map_err(|source| StoreError::Pack { id: *id, source })
    }

    /// Load one package's manifest.
    pub fn load_manifest(&self, id: &SnapshotId) -> StoreResult<Vec<ManifestEntry>> {
        Ok(self.load_package(id)?.into_entries())
    }

    /// Load every package's manifest except the excluded ids, in ascending
    /// id order. This is the dedup resolver's view of history.
    pub fn load_all_manifests(
        &self,
        exclude: &HashSet<SnapshotId>,
    ) -> StoreResult<Vec<(SnapshotId, Vec<ManifestEntry>)>> {
        let mut manifests = Vec::new();
        for id in self.list()? {
            if exclude.contains(&id) {
                continue;
            }
            manifests.push((id, self.load_manifest(&id)?));
        }
        Ok(manifests)
    }

    /// Persist a new package, atomically.
    ///
    /// Returns `true` if a package was written, `false` if an identical one
    /// already existed (expected when re-packing an unchanged tree, since
    /// the id is a content hash). An existing id with a *different*
    /// manifest is a [`StoreError::Consistency`] and is never overwritten.
    pub fn create(
        &self,
        id: &SnapshotId,
        entries: &[ManifestEntry],
        source: &dyn ContentSource,
    ) -> StoreResult<bool> {
        if self.contains(id) {
            let stored = self.load_manifest(id)?;
            if stored == entries {
                debug!(id = %id.short_hex(), "package already present, create is a no-op");
                return Ok(false);
            }
            return Err(StoreError::Consistency { id: *id });
        }

        let bytes = PackageWriter::encode(id, entries, source)
            .map_err(|source| StoreError::Pack { id: *id, source })?;

        // Write to a temp file in the store directory and rename into
        // place, so a reader never observes a partially written package.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.package_path(id)).map_err(|e| e.error)?;

        debug!(id = %id.short_hex(), bytes = bytes.len(), "package written");
        Ok(true)
    }

    fn package_path(&self, id: &SnapshotId) -> PathBuf {
        self.dir.join(id.to_hex())
    }
}
