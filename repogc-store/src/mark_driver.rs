//! The mark phase driver: batches a stream of candidate content IDs into durable mark manifests.
//!
//! The batching loop pulls one item at a time from the iterator rather than chunking it up front,
//! so a slow consumer naturally throttles the producer instead of buffering the whole candidate
//! set in memory.

use repogc_api_types::{ContentId, GcMarkStatus, ManifestId};

use crate::collaborators::{ContentManager, ManifestStore};
use crate::error::{GcError, GcResult};
use crate::mark_manifest::publish_mark;
use crate::task::GcWorker;

/// Drive `to_delete` to completion, publishing one mark per batch of at most `batch_size`.
/// Returns aggregate status for the whole pass.
///
/// `snapshots` is the live snapshot ID set captured atomically at the start of the pass; the same
/// value is attached to every manifest this invocation publishes.
pub fn run_mark(
    content_manager: &dyn ContentManager,
    manifest_store: &dyn ManifestStore,
    worker: &dyn GcWorker,
    to_delete: impl Iterator<Item = ContentId>,
    snapshots: Vec<ManifestId>,
    batch_size: usize,
) -> GcResult<GcMarkStatus> {
    if batch_size == 0 {
        return Err(GcError::integrity("batch_size must be > 0"));
    }

    let mut status = GcMarkStatus {
        snapshots_observed: snapshots.len(),
        ..GcMarkStatus::default()
    };

    let mut to_delete = to_delete.peekable();

    loop {
        if to_delete.peek().is_none() {
            break;
        }

        // Checked between batches, never mid-flip: the previous batch (if any) has already been
        // fully published by the time we get here.
        worker.check_abort()?;

        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match to_delete.next() {
                Some(id) => batch.push(id),
                None => break,
            }
        }

        let batch_len = batch.len();
        publish_mark(content_manager, manifest_store, snapshots.clone(), batch)?;

        status.contents_marked += batch_len;
        status.manifests_published += 1;
    }

    Ok(status)
}
