//! Shared, narrow data types used across the repogc crates.
//!
//! Kept free of API-schema macro machinery: there is no REST/CLI argument schema to generate
//! here, just plain serde types.

mod ids;
mod status;

pub use ids::{sort_content_ids, sort_manifest_ids, BlobId, ContentId, ManifestId};
pub use status::{GcMarkStatus, RepairStatus};

use std::collections::BTreeMap;

/// Label map attached to a manifest-store document. `BTreeMap` so label-set equality and the
/// `type=gc-mark` lookup are deterministic.
pub type Labels = BTreeMap<String, String>;

/// Label prefix used to tag every GC-mark-details content.
pub const GC_CONTENT_PREFIX: &str = "gc";

/// Label value identifying a mark manifest.
pub const GC_MARK_MANIFEST_TYPE: &str = "gc-mark";

/// Build the label set used to publish and to look up mark manifests.
pub fn mark_manifest_labels() -> Labels {
    let mut labels = Labels::new();
    labels.insert("type".to_string(), GC_MARK_MANIFEST_TYPE.to_string());
    labels
}
