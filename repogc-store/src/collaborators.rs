//! Narrow contracts for the four external collaborators the garbage collector depends on: the
//! blob store, content manager, manifest store, and snapshot walker.
//!
//! None of these are implemented here as production storage backends; they exist purely as the
//! seam the GC core depends on, the same way a chunk store depends on an abstract task context
//! rather than a concrete tracking server. `memstore.rs` provides the one reference
//! implementation this crate ships, for tests and for the CLI's standalone mode.

use std::time::SystemTime;

use repogc_api_types::{BlobId, ContentId, Labels, ManifestId};

use crate::error::GcResult;

/// Current state of one content item, as reported by the content manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentInfo {
    pub id: ContentId,
    pub pack_blob_id: BlobId,
    pub offset: u64,
    pub length: u32,
    pub deleted: bool,
}

/// One entry returned by a manifest-store listing.
#[derive(Clone, Debug)]
pub struct ManifestEntry {
    pub id: ManifestId,
    pub labels: Labels,
    /// Server-assigned timestamp, used for `min_gc_mark_age` age comparisons.
    pub modified: SystemTime,
}

/// One file-system entry produced while walking a snapshot.
#[derive(Clone, Debug)]
pub struct SnapshotEntry {
    pub object_id: String,
}

/// Deduplicated, encrypted content storage keyed by `ContentId`.
pub trait ContentManager: Send + Sync {
    fn write_content(&self, data: &[u8], prefix: &str) -> GcResult<ContentId>;
    fn get_content(&self, id: &ContentId) -> GcResult<Vec<u8>>;
    fn content_info(&self, id: &ContentId) -> GcResult<ContentInfo>;
    /// Flips `deleted = true`. Idempotent.
    fn delete_content(&self, id: &ContentId) -> GcResult<()>;
    /// Flips `deleted = false`. Idempotent.
    fn undelete_content(&self, id: &ContentId) -> GcResult<()>;
    /// Invoke `callback` once per content whose ID carries `prefix`.
    fn iterate_contents(
        &self,
        prefix: &str,
        callback: &mut dyn FnMut(ContentInfo) -> GcResult<()>,
    ) -> GcResult<()>;
    /// Resolve an object ID (as produced by the snapshot walker) to the content IDs backing it.
    fn verify_object(&self, object_id: &str) -> GcResult<Vec<ContentId>>;
}

/// Key/value store of labelled JSON documents with monotonic revisions.
pub trait ManifestStore: Send + Sync {
    fn find(&self, labels: &Labels) -> GcResult<Vec<ManifestEntry>>;
    fn get(&self, id: &ManifestId) -> GcResult<Vec<u8>>;
    fn put(&self, labels: Labels, body: &[u8]) -> GcResult<ManifestId>;
    fn delete(&self, id: &ManifestId) -> GcResult<()>;
}

/// Opaque-blob object store. Not touched directly by the cache or GC core (the content manager
/// owns blob placement); named here for completeness of the external-collaborator contract and
/// for a storage backend that wants to implement caching below the content manager.
pub trait BlobStore: Send + Sync {
    fn get(&self, id: &BlobId, offset: u64, length: u64) -> GcResult<Vec<u8>>;
    fn put(&self, id: &BlobId, data: &[u8]) -> GcResult<()>;
    fn delete(&self, id: &BlobId) -> GcResult<()>;
    fn list(&self, prefix: &str, callback: &mut dyn FnMut(&BlobId) -> GcResult<()>) -> GcResult<()>;
}

/// Produces a sequence of file-system entries with object IDs from a set of snapshot manifests.
pub trait SnapshotWalker: Send + Sync {
    fn walk_snapshots(
        &self,
        manifest_ids: &[ManifestId],
        callback: &mut dyn FnMut(SnapshotEntry) -> GcResult<()>,
    ) -> GcResult<()>;
}

/// Label value identifying a snapshot manifest, used by repair to snapshot the currently live
/// set of snapshots.
pub const SNAPSHOT_MANIFEST_TYPE: &str = "snapshot";

pub fn snapshot_manifest_labels() -> Labels {
    let mut labels = Labels::new();
    labels.insert("type".to_string(), SNAPSHOT_MANIFEST_TYPE.to_string());
    labels
}
