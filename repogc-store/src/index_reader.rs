//! Mmapped reader for `.sndx` cache files — the read half of the disk index cache.
//!
//! Open-and-mmap on construction, `munmap` in `Drop`, `unsafe impl Send + Sync` (the mapping is
//! not thread-local, so it is sound to hand a `&IndexReader` across threads). The on-disk record
//! layout below is this crate's own concrete realization of a cached index entry; the wire format
//! of the index blob itself belongs to the content manager, which lives outside this crate.

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use openssl::sha::sha256;

use crate::error::{GcError, GcResult};

/// One record per cached content entry: full digest of the `ContentId`, full digest of the
/// `BlobId` it resolved to at cache-write time, the byte range within that blob, a deleted flag,
/// and the mtime the record was written with.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IndexRecord {
    pub content_digest: [u8; 32],
    pub pack_blob_digest: [u8; 32],
    pub offset: u64,
    pub length: u32,
    pub deleted: u8,
    reserved: [u8; 7],
    pub mtime: i64,
}

proxmox_lang::static_assert_size!(IndexRecord, 96);

impl IndexRecord {
    pub fn new(content_id: &str, pack_blob_id: &str, offset: u64, length: u32, mtime: i64) -> Self {
        IndexRecord {
            content_digest: sha256(content_id.as_bytes()),
            pack_blob_digest: sha256(pack_blob_id.as_bytes()),
            offset,
            length,
            deleted: 0,
            reserved: [0; 7],
            mtime,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted != 0
    }
}

const RECORD_SIZE: usize = std::mem::size_of::<IndexRecord>();

/// Read-only mmapped view over one `.sndx` cache file.
///
/// Lookups are linear scans over the mapped records: cache files are one per pack blob and stay
/// small, so a hash index would add complexity without a measurable win.
pub struct IndexReader {
    _file: File,
    data: *const u8,
    record_count: usize,
}

unsafe impl Send for IndexReader {}
unsafe impl Sync for IndexReader {}

impl Drop for IndexReader {
    fn drop(&mut self) {
        if let Err(err) = self.unmap() {
            log::error!("unable to unmap index file: {}", err);
        }
    }
}

impl IndexReader {
    pub fn open(path: &Path) -> GcResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(GcError::not_found(format!("index blob {:?}", path)));
            }
            Err(err) => return Err(GcError::from(err)),
        };
        Self::new(file).map_err(|err| {
            GcError::integrity(format!("unable to open index {:?}: {}", path, err))
        })
    }

    fn new(file: File) -> GcResult<Self> {
        let stat = nix::sys::stat::fstat(file.as_raw_fd())
            .map_err(|err| GcError::integrity(format!("fstat failed: {}", err)))?;

        let size = stat.st_size as usize;
        if size % RECORD_SIZE != 0 {
            return Err(GcError::integrity(format!(
                "index size {} is not a multiple of the record size {}",
                size, RECORD_SIZE
            )));
        }

        let record_count = size / RECORD_SIZE;

        if record_count == 0 {
            return Ok(IndexReader {
                _file: file,
                data: std::ptr::null(),
                record_count: 0,
            });
        }

        let data = unsafe {
            nix::sys::mman::mmap(
                None,
                std::num::NonZeroUsize::new(size).unwrap(),
                nix::sys::mman::ProtFlags::PROT_READ,
                nix::sys::mman::MapFlags::MAP_PRIVATE,
                file.as_raw_fd(),
                0,
            )
        }
        .map_err(|err| GcError::integrity(format!("mmap failed: {}", err)))? as *const u8;

        Ok(IndexReader {
            _file: file,
            data,
            record_count,
        })
    }

    fn unmap(&mut self) -> GcResult<()> {
        if self.data.is_null() {
            return Ok(());
        }
        let size = self.record_count * RECORD_SIZE;
        unsafe {
            nix::sys::mman::munmap(self.data as *mut std::ffi::c_void, size)
                .map_err(|err| GcError::integrity(format!("munmap failed: {}", err)))?;
        }
        self.data = std::ptr::null();
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn record(&self, pos: usize) -> Option<&IndexRecord> {
        if pos >= self.record_count {
            return None;
        }
        Some(unsafe { &*(self.data.add(pos * RECORD_SIZE) as *const IndexRecord) })
    }

    /// Linear lookup by content ID digest. Returns the first non-deleted match.
    pub fn lookup(&self, content_id: &str) -> Option<&IndexRecord> {
        let digest = sha256(content_id.as_bytes());
        (0..self.record_count)
            .filter_map(|pos| self.record(pos))
            .find(|rec| rec.content_digest == digest && !rec.is_deleted())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexRecord> {
        (0..self.record_count).filter_map(move |pos| self.record(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_records(records: &[IndexRecord]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for rec in records {
            let bytes = unsafe {
                std::slice::from_raw_parts(rec as *const IndexRecord as *const u8, RECORD_SIZE)
            };
            file.write_all(bytes).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn round_trips_records() {
        let a = IndexRecord::new("content-a", "blob-a", 0, 4096, 1000);
        let mut b = IndexRecord::new("content-b", "blob-b", 4096, 2048, 1001);
        b.deleted = 1;

        let file = write_records(&[a, b]);
        let reader = IndexReader::open(file.path()).unwrap();

        assert_eq!(reader.record_count(), 2);
        assert!(reader.lookup("content-a").is_some());
        // deleted records are excluded from lookup
        assert!(reader.lookup("content-b").is_none());
        assert!(reader.record(1).unwrap().is_deleted());
    }

    #[test]
    fn rejects_truncated_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        file.flush().unwrap();
        assert!(IndexReader::open(file.path()).is_err());
    }
}
