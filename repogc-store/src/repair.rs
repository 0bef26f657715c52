//! Repair-and-purge: re-checks mark decisions once they have aged past quarantine.
//!
//! For each mark manifest old enough to inspect, computes `snaps_to_check = live − observed −
//! already_checked`, walks those snapshots to undelete anything they still reference, then
//! finalizes or purges the rest. Undelete is wired through fully; final content deletion (as
//! opposed to finalizing the `deleted` flag) is left to a later space-reclamation pass, noted in
//! DESIGN.md.

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use repogc_api_types::{ManifestId, RepairStatus};

use crate::collaborators::{snapshot_manifest_labels, ContentManager, ManifestEntry, ManifestStore, SnapshotWalker};
use crate::error::GcResult;
use crate::mark_manifest::{details_id_of, MarkDetails};
use crate::task::GcWorker;
use repogc_api_types::mark_manifest_labels;

/// Run one repair-and-purge pass. `min_gc_mark_age` is the quarantine duration; callers must set
/// it explicitly rather than this crate defaulting it.
pub fn run_repair(
    content_manager: &dyn ContentManager,
    manifest_store: &dyn ManifestStore,
    snapshot_walker: &dyn SnapshotWalker,
    worker: &dyn GcWorker,
    min_gc_mark_age: Duration,
) -> GcResult<RepairStatus> {
    let now = SystemTime::now();

    // Step 1: list mark manifests older than min_gc_mark_age, oldest first.
    let mut candidates: Vec<ManifestEntry> = manifest_store
        .find(&mark_manifest_labels())?
        .into_iter()
        .filter(|entry| {
            now.duration_since(entry.modified)
                .map(|age| age >= min_gc_mark_age)
                .unwrap_or(false)
        })
        .collect();
    candidates.sort_by_key(|entry| entry.modified);

    // Step 2: snapshot the currently live set of snapshot manifests S.
    let live_snapshots: HashSet<ManifestId> = manifest_store
        .find(&snapshot_manifest_labels())?
        .into_iter()
        .map(|entry| entry.id)
        .collect();

    let mut status = RepairStatus::default();
    let mut already_checked: HashSet<ManifestId> = HashSet::new();

    for mark in candidates {
        worker.check_abort()?;
        status.marks_inspected += 1;

        if let Err(err) = process_one_mark(
            content_manager,
            manifest_store,
            snapshot_walker,
            &mark,
            &live_snapshots,
            &mut already_checked,
            &mut status,
        ) {
            crate::gc_warn!(worker, "repair: mark {} left in place after error: {}", mark.id, err);
        }
    }

    Ok(status)
}

fn process_one_mark(
    content_manager: &dyn ContentManager,
    manifest_store: &dyn ManifestStore,
    snapshot_walker: &dyn SnapshotWalker,
    mark: &ManifestEntry,
    live_snapshots: &HashSet<ManifestId>,
    already_checked: &mut HashSet<ManifestId>,
    status: &mut RepairStatus,
) -> GcResult<()> {
    // a. load details. A NotFound here means a prior pass already deleted the details content
    // but was interrupted before deleting the manifest itself (see step e) — finish that off
    // rather than failing this mark again on every future pass.
    let manifest_body = manifest_store.get(&mark.id)?;
    let details_id = details_id_of(&manifest_body)?;
    let details_body = match content_manager.get_content(&details_id) {
        Ok(body) => body,
        Err(err) if err.is_benign_not_found() => {
            match manifest_store.delete(&mark.id) {
                Ok(()) => {}
                Err(err) if err.is_benign_not_found() => {}
                Err(err) => return Err(err),
            }
            status.marks_purged += 1;
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    let details = MarkDetails::decode(&details_body)?;

    let observed_snapshots: HashSet<ManifestId> = details.snapshots.iter().cloned().collect();

    // b. snapshots live now but invisible to the mark pass and not yet walked this invocation.
    let snaps_to_check: Vec<ManifestId> = live_snapshots
        .iter()
        .filter(|id| !observed_snapshots.contains(*id) && !already_checked.contains(*id))
        .cloned()
        .collect();

    // c. walk those snapshots, undelete anything they still reference. Only mark a snapshot
    // checked once its walk has actually completed: an error partway through must leave it
    // eligible for a later mark in this same pass to re-walk, not silently skipped.
    if !snaps_to_check.is_empty() {
        snapshot_walker.walk_snapshots(&snaps_to_check, &mut |entry| {
            let content_ids = content_manager.verify_object(&entry.object_id)?;
            for content_id in content_ids {
                let info = content_manager.content_info(&content_id)?;
                if info.deleted {
                    content_manager.undelete_content(&content_id)?;
                    status.contents_undeleted += 1;
                }
            }
            Ok(())
        })?;

        status.snapshots_walked += snaps_to_check.len();
        for id in &snaps_to_check {
            already_checked.insert(id.clone());
        }
    }

    // d. finalize or skip each content named in this mark's batch. NotFound here is a read-path
    // failure (the content manager should be able to report on anything this mark still names)
    // so it propagates rather than being treated as already-resolved.
    for content_id in &details.marked_content {
        let info = content_manager.content_info(content_id)?;

        if info.deleted {
            // Final space reclamation is a separate, later pass; this phase's contract ends at
            // confirming the flag stays flipped.
            status.contents_purged += 1;
        } else {
            log::debug!("repair: content {} already undeleted by a prior pass, skipping", content_id);
        }
    }

    // e. details content before manifest; an orphan details is harmless, an orphan manifest
    // points at nothing.
    match content_manager.delete_content(&details_id) {
        Ok(()) => {}
        Err(err) if err.is_benign_not_found() => {}
        Err(err) => return Err(err),
    }
    match manifest_store.delete(&mark.id) {
        Ok(()) => {}
        Err(err) if err.is_benign_not_found() => {}
        Err(err) => return Err(err),
    }

    status.marks_purged += 1;

    Ok(())
}
