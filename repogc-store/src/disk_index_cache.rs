//! Disk cache of committed content index blobs, written once and never mutated in place.
//!
//! Ingest is atomic rename, eviction is an age-gated sweep over entries not currently in use,
//! both modeled after the chunk-store's own insert/touch/sweep discipline.

use std::collections::HashSet;
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use nix::sys::stat::Mode;
use proxmox_sys::fs::{create_path, replace_file, CreateOptions};

use repogc_api_types::BlobId;

use crate::error::{GcError, GcResult};
use crate::index_reader::IndexReader;

const CACHE_SUFFIX: &str = ".sndx";

/// A stale entry survives one `expire_unused` pass if it was touched within the last hour, in
/// case a concurrent process has it in use but has not yet published that to its `in_use` set.
const UNUSED_CLEANUP_HORIZON: Duration = Duration::from_secs(3600);

/// On-disk cache of immutable index blobs. No in-process locks are held across I/O; concurrency
/// safety between threads and between processes both come entirely from atomic rename.
pub struct DiskIndexCache {
    dir: PathBuf,
    /// Serializes only the directory-creation retry in `add`; the rename itself needs no lock.
    create_lock: Mutex<()>,
}

impl DiskIndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskIndexCache {
            dir: dir.into(),
            create_lock: Mutex::new(()),
        }
    }

    fn entry_path(&self, blob_id: &BlobId) -> GcResult<PathBuf> {
        if blob_id.as_str().is_empty()
            || blob_id.as_str().contains(std::path::is_separator)
            || blob_id.as_str() == "."
            || blob_id.as_str() == ".."
        {
            return Err(GcError::integrity(format!(
                "blob id {:?} is not a valid cache file name component",
                blob_id.as_str()
            )));
        }
        Ok(self.dir.join(format!("{}{}", blob_id.as_str(), CACHE_SUFFIX)))
    }

    pub fn has(&self, blob_id: &BlobId) -> GcResult<bool> {
        match std::fs::metadata(self.entry_path(blob_id)?) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(GcError::from(err)),
        }
    }

    /// Mmaps the cache file. The returned reader owns its mapping independently of the cache; it
    /// stays valid until dropped even if `expire_unused` later deletes the backing path name —
    /// deletion only unlinks the directory entry, the mapping keeps the inode alive.
    ///
    /// No existence pre-check: `IndexReader::open` surfaces a missing file as `NotFound` itself,
    /// so there is no separate stat-then-open window for `expire_unused` to race into.
    pub fn open(&self, blob_id: &BlobId) -> GcResult<IndexReader> {
        let path = self.entry_path(blob_id)?;
        IndexReader::open(&path)
    }

    /// No-op if already present, otherwise write-temp-then-rename via
    /// `proxmox_sys::fs::replace_file`. A rename failure is only a real error if a concurrent
    /// writer didn't win the race either; `replace_file` surfaces a plain I/O error either way,
    /// so the race check happens here.
    pub fn add(&self, blob_id: &BlobId, bytes: &[u8]) -> GcResult<()> {
        if self.has(blob_id)? {
            return Ok(());
        }

        let options = CreateOptions::new().perm(Mode::from_bits_truncate(0o700));

        {
            let _lock = self.create_lock.lock().unwrap();
            if !self.dir.is_dir() {
                create_path(&self.dir, Some(options.clone()), Some(options.clone()))
                    .map_err(|err| GcError::integrity(format!("creating cache dir failed: {}", err)))?;
            }
        }

        let path = self.entry_path(blob_id)?;

        match replace_file(&path, bytes, options, false) {
            Ok(()) => Ok(()),
            Err(err) => {
                if self.has(blob_id)? {
                    // a peer produced the file first; both sides end up with the intended
                    // content so this is not an error, but it's worth a log line to distinguish
                    // from a first-writer no-op.
                    log::debug!("{}", GcError::CacheRaceLost(blob_id.as_str().to_string()));
                    Ok(())
                } else {
                    Err(GcError::CacheWriteFailed(blob_id.as_str().to_string(), err))
                }
            }
        }
    }

    /// Age-gated set difference against `in_use`. Returns the number of entries actually removed.
    /// Per-file delete errors are logged and do not abort the sweep.
    pub fn expire_unused(&self, in_use: &HashSet<BlobId>) -> GcResult<usize> {
        let entries = match read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(GcError::from(err)),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("expire_unused: readdir entry failed: {}", err);
                    continue;
                }
            };
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(blob_str) = file_name.strip_suffix(CACHE_SUFFIX) else {
                continue;
            };
            let blob_id = BlobId::from(blob_str);
            if in_use.contains(&blob_id) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    log::warn!("expire_unused: stat failed for {:?}: {}", entry.path(), err);
                    continue;
                }
            };

            let age = match metadata.modified().and_then(|mtime| {
                now.duration_since(mtime)
                    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
            }) {
                Ok(age) => age,
                Err(_) => continue,
            };

            if age < UNUSED_CLEANUP_HORIZON {
                continue;
            }

            if let Err(err) = std::fs::remove_file(entry.path()) {
                log::warn!("expire_unused: failed to remove {:?}: {}", entry.path(), err);
                continue;
            }
            removed += 1;
        }

        Ok(removed)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (tempfile::TempDir, DiskIndexCache) {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DiskIndexCache::new(tmp.path().join("cache"));
        (tmp, cache)
    }

    #[test]
    fn add_then_has() {
        let (_tmp, cache) = cache();
        let id = BlobId::from("p0000000000000000000000000000000000000000000000000000000000000000");
        assert!(!cache.has(&id).unwrap());
        cache.add(&id, b"hello").unwrap();
        assert!(cache.has(&id).unwrap());
    }

    #[test]
    fn add_is_idempotent() {
        let (_tmp, cache) = cache();
        let id = BlobId::from("blob1");
        cache.add(&id, b"first").unwrap();
        cache.add(&id, b"second").unwrap();
        let reader = cache.open(&id).unwrap();
        assert_eq!(reader.record_count(), 0);
    }

    #[test]
    fn open_missing_is_not_found() {
        let (_tmp, cache) = cache();
        let id = BlobId::from("nope");
        assert!(matches!(cache.open(&id), Err(GcError::NotFound(_))));
    }

    #[test]
    fn rejects_path_traversal_blob_ids() {
        let (_tmp, cache) = cache();
        for bad in ["../escape", "a/b", "..", "", "/etc/passwd"] {
            let id = BlobId::from(bad);
            assert!(matches!(cache.add(&id, b"x"), Err(GcError::Integrity(_))));
            assert!(matches!(cache.has(&id), Err(GcError::Integrity(_))));
        }
    }

    #[test]
    fn expire_unused_keeps_fresh_and_in_use_entries() {
        let (_tmp, cache) = cache();
        let kept_in_use = BlobId::from("kept-in-use");
        let kept_fresh = BlobId::from("kept-fresh");
        cache.add(&kept_in_use, b"a").unwrap();
        cache.add(&kept_fresh, b"b").unwrap();

        let mut in_use = HashSet::new();
        in_use.insert(kept_in_use.clone());

        let removed = cache.expire_unused(&in_use).unwrap();
        assert_eq!(removed, 0);
        assert!(cache.has(&kept_in_use).unwrap());
        assert!(cache.has(&kept_fresh).unwrap());
    }
}
