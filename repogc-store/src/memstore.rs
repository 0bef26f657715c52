//! In-memory reference implementations of the four collaborator traits.
//!
//! This is the one concrete backend this crate ships; production deployments are expected to
//! supply real blob/content/manifest/snapshot backends through the same traits.

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use repogc_api_types::{BlobId, ContentId, Labels, ManifestId};

use crate::collaborators::{
    BlobStore, ContentInfo, ContentManager, ManifestEntry, ManifestStore, SnapshotEntry, SnapshotWalker,
};
use crate::error::{GcError, GcResult};

struct StoredContent {
    info: ContentInfo,
    data: Vec<u8>,
}

struct StoredManifest {
    labels: Labels,
    body: Vec<u8>,
    modified: std::time::SystemTime,
}

/// One self-contained fake repository: blobs, contents, and manifests all held in memory behind
/// a mutex apiece, mirroring the granularity real backends would use (one lock per store, not one
/// giant lock for the whole repo).
pub struct MemStore {
    blobs: Mutex<BTreeMap<BlobId, Vec<u8>>>,
    contents: RwLock<BTreeMap<ContentId, StoredContent>>,
    manifests: RwLock<BTreeMap<ManifestId, StoredManifest>>,
    /// Maps a synthetic object ID (as produced by `fake_snapshot`) to the content IDs it covers,
    /// standing in for the snapshot walker's real filesystem traversal.
    objects: RwLock<BTreeMap<String, Vec<ContentId>>>,
    next_id: Mutex<u64>,
}

impl Default for MemStore {
    fn default() -> Self {
        MemStore {
            blobs: Mutex::new(BTreeMap::new()),
            contents: RwLock::new(BTreeMap::new()),
            manifests: RwLock::new(BTreeMap::new()),
            objects: RwLock::new(BTreeMap::new()),
            next_id: Mutex::new(0),
        }
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        format!("{}-{:08x}", prefix, *next_id)
    }

    /// Test/fixture helper: register a content item directly, bypassing `write_content`, for
    /// seeding a repository with pre-existing contents.
    pub fn seed_content(&self, id: ContentId, data: Vec<u8>) {
        let info = ContentInfo {
            id: id.clone(),
            pack_blob_id: BlobId::from("seed-blob"),
            offset: 0,
            length: data.len() as u32,
            deleted: false,
        };
        self.contents
            .write()
            .unwrap()
            .insert(id, StoredContent { info, data });
    }

    /// Test/fixture helper: register a synthetic "snapshot object" that walking a given snapshot
    /// manifest will expose, and publish the snapshot manifest that references it.
    pub fn fake_snapshot(&self, content_ids: Vec<ContentId>) -> ManifestId {
        let object_id = self.fresh_id("obj");
        self.objects
            .write()
            .unwrap()
            .insert(object_id.clone(), content_ids);

        let mut labels = crate::collaborators::snapshot_manifest_labels();
        labels.insert("object".to_string(), object_id);
        self.put_manifest(labels, b"{}".to_vec())
    }

    /// Test/fixture helper: push every stored manifest's `modified` timestamp back by `delta`, so
    /// tests can simulate a mark clearing its quarantine window without sleeping.
    pub fn age_all_manifests(&self, delta: std::time::Duration) {
        for stored in self.manifests.write().unwrap().values_mut() {
            stored.modified -= delta;
        }
    }

    fn put_manifest(&self, labels: Labels, body: Vec<u8>) -> ManifestId {
        let id = ManifestId::from(self.fresh_id("manifest"));
        self.manifests.write().unwrap().insert(
            id.clone(),
            StoredManifest {
                labels,
                body,
                modified: std::time::SystemTime::now(),
            },
        );
        id
    }
}

impl ContentManager for MemStore {
    fn write_content(&self, data: &[u8], prefix: &str) -> GcResult<ContentId> {
        let id = ContentId::from(self.fresh_id(prefix));
        let info = ContentInfo {
            id: id.clone(),
            pack_blob_id: BlobId::from(self.fresh_id("blob")),
            offset: 0,
            length: data.len() as u32,
            deleted: false,
        };
        self.contents.write().unwrap().insert(
            id.clone(),
            StoredContent {
                info,
                data: data.to_vec(),
            },
        );
        Ok(id)
    }

    fn get_content(&self, id: &ContentId) -> GcResult<Vec<u8>> {
        self.contents
            .read()
            .unwrap()
            .get(id)
            .map(|stored| stored.data.clone())
            .ok_or_else(|| GcError::not_found(format!("content {}", id)))
    }

    fn content_info(&self, id: &ContentId) -> GcResult<ContentInfo> {
        self.contents
            .read()
            .unwrap()
            .get(id)
            .map(|stored| stored.info.clone())
            .ok_or_else(|| GcError::not_found(format!("content {}", id)))
    }

    fn delete_content(&self, id: &ContentId) -> GcResult<()> {
        let mut contents = self.contents.write().unwrap();
        match contents.get_mut(id) {
            Some(stored) => {
                stored.info.deleted = true;
                Ok(())
            }
            None => Ok(()), // idempotent: already gone counts as success
        }
    }

    fn undelete_content(&self, id: &ContentId) -> GcResult<()> {
        let mut contents = self.contents.write().unwrap();
        match contents.get_mut(id) {
            Some(stored) => {
                stored.info.deleted = false;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn iterate_contents(
        &self,
        prefix: &str,
        callback: &mut dyn FnMut(ContentInfo) -> GcResult<()>,
    ) -> GcResult<()> {
        let contents = self.contents.read().unwrap();
        for (id, stored) in contents.iter() {
            if id.as_str().starts_with(prefix) {
                callback(stored.info.clone())?;
            }
        }
        Ok(())
    }

    fn verify_object(&self, object_id: &str) -> GcResult<Vec<ContentId>> {
        self.objects
            .read()
            .unwrap()
            .get(object_id)
            .cloned()
            .ok_or_else(|| GcError::not_found(format!("object {}", object_id)))
    }
}

impl ManifestStore for MemStore {
    fn find(&self, labels: &Labels) -> GcResult<Vec<ManifestEntry>> {
        let manifests = self.manifests.read().unwrap();
        Ok(manifests
            .iter()
            .filter(|(_, stored)| labels.iter().all(|(k, v)| stored.labels.get(k) == Some(v)))
            .map(|(id, stored)| ManifestEntry {
                id: id.clone(),
                labels: stored.labels.clone(),
                modified: stored.modified,
            })
            .collect())
    }

    fn get(&self, id: &ManifestId) -> GcResult<Vec<u8>> {
        self.manifests
            .read()
            .unwrap()
            .get(id)
            .map(|stored| stored.body.clone())
            .ok_or_else(|| GcError::not_found(format!("manifest {}", id)))
    }

    fn put(&self, labels: Labels, body: &[u8]) -> GcResult<ManifestId> {
        Ok(self.put_manifest(labels, body.to_vec()))
    }

    fn delete(&self, id: &ManifestId) -> GcResult<()> {
        self.manifests.write().unwrap().remove(id);
        Ok(())
    }
}

impl BlobStore for MemStore {
    fn get(&self, id: &BlobId, offset: u64, length: u64) -> GcResult<Vec<u8>> {
        let blobs = self.blobs.lock().unwrap();
        let data = blobs
            .get(id)
            .ok_or_else(|| GcError::not_found(format!("blob {}", id)))?;
        let start = offset as usize;
        let end = (offset + length) as usize;
        if end > data.len() {
            return Err(GcError::integrity(format!(
                "short blob {}: wanted {}..{}, have {}",
                id,
                start,
                end,
                data.len()
            )));
        }
        Ok(data[start..end].to_vec())
    }

    fn put(&self, id: &BlobId, data: &[u8]) -> GcResult<()> {
        self.blobs.lock().unwrap().insert(id.clone(), data.to_vec());
        Ok(())
    }

    fn delete(&self, id: &BlobId) -> GcResult<()> {
        self.blobs.lock().unwrap().remove(id);
        Ok(())
    }

    fn list(&self, prefix: &str, callback: &mut dyn FnMut(&BlobId) -> GcResult<()>) -> GcResult<()> {
        let blobs = self.blobs.lock().unwrap();
        for id in blobs.keys() {
            if id.as_str().starts_with(prefix) {
                callback(id)?;
            }
        }
        Ok(())
    }
}

impl SnapshotWalker for MemStore {
    fn walk_snapshots(
        &self,
        manifest_ids: &[ManifestId],
        callback: &mut dyn FnMut(SnapshotEntry) -> GcResult<()>,
    ) -> GcResult<()> {
        let manifests = self.manifests.read().unwrap();
        let objects = self.objects.read().unwrap();
        for manifest_id in manifest_ids {
            let Some(stored) = manifests.get(manifest_id) else {
                continue;
            };
            let Some(object_id) = stored.labels.get("object") else {
                continue;
            };
            if objects.contains_key(object_id) {
                callback(SnapshotEntry {
                    object_id: object_id.clone(),
                })?;
            }
        }
        Ok(())
    }
}
