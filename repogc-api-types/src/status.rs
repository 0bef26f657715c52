use serde::{Deserialize, Serialize};

/// Summary of one mark-phase invocation. Scoped down to what the mark phase itself produces
/// rather than a full chunk-store sweep.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GcMarkStatus {
    /// Number of mark-manifest/mark-details pairs published.
    pub manifests_published: usize,
    /// Number of content IDs flipped to `deleted` across all batches.
    pub contents_marked: usize,
    /// Size of the live-snapshot set observed for this mark pass.
    pub snapshots_observed: usize,
}

/// Summary of one repair-and-purge invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepairStatus {
    /// Mark manifests older than `min_gc_mark_age` that were inspected.
    pub marks_inspected: usize,
    /// Mark manifests (+ their details content) removed because their contents stayed deleted.
    pub marks_purged: usize,
    /// Content IDs flipped back from `deleted` because a new snapshot referenced them.
    pub contents_undeleted: usize,
    /// Content IDs confirmed still unreferenced and left/finalized as deleted.
    pub contents_purged: usize,
    /// Snapshots walked while checking for reuse.
    pub snapshots_walked: usize,
}
