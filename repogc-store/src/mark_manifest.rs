//! The mark manifest writer: publishes one durable (details, manifest) pair per mark batch.
//!
//! `MarkDetails` is a small, serde-derived, JSON-bodied document, shaped the way the rest of this
//! crate's manifest bodies are: canonical sorted arrays so two processes that agree on a batch
//! produce byte-identical output.

use serde::{Deserialize, Serialize};

use repogc_api_types::{mark_manifest_labels, sort_content_ids, sort_manifest_ids};
use repogc_api_types::{ContentId, ManifestId, GC_CONTENT_PREFIX};

use crate::collaborators::{ContentManager, ManifestStore};
use crate::error::{GcError, GcResult};

/// Body of a mark-details content. Both arrays are always stored in canonical sorted order —
/// `new`/`decode` enforce it, so there is no path that can produce an unsorted `MarkDetails`
/// value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkDetails {
    pub snapshots: Vec<ManifestId>,
    #[serde(rename = "markedContent")]
    pub marked_content: Vec<ContentId>,
}

impl MarkDetails {
    pub fn new(mut snapshots: Vec<ManifestId>, mut marked_content: Vec<ContentId>) -> Self {
        sort_manifest_ids(&mut snapshots);
        sort_content_ids(&mut marked_content);
        MarkDetails {
            snapshots,
            marked_content,
        }
    }

    pub fn encode(&self) -> GcResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| GcError::integrity(format!("encoding mark details: {}", err)))
    }

    /// `decode(encode(x)) == x` for well-formed input; re-sorting here also means a hand-edited
    /// or foreign-produced body is normalized rather than trusted verbatim.
    pub fn decode(bytes: &[u8]) -> GcResult<Self> {
        let raw: MarkDetails = serde_json::from_slice(bytes)
            .map_err(|err| GcError::integrity(format!("decoding mark details: {}", err)))?;
        Ok(MarkDetails::new(raw.snapshots, raw.marked_content))
    }
}

/// Body of a mark manifest: just a pointer at the companion details content.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct MarkManifestBody {
    details_id: ContentId,
}

/// Publish one (mark-details content, mark-manifest) pair.
///
/// `marked_content` must be non-empty; an empty batch has nothing to publish and callers (the
/// mark driver) must not invoke this for an empty slice.
pub fn publish_mark(
    content_manager: &dyn ContentManager,
    manifest_store: &dyn ManifestStore,
    snapshots: Vec<ManifestId>,
    marked_content: Vec<ContentId>,
) -> GcResult<ManifestId> {
    debug_assert!(!marked_content.is_empty(), "publish_mark called with an empty batch");

    // Step 2: flip deleted flags. If any flip fails the batch aborts without publishing anything
    // — nothing written so far (there is nothing written yet) needs to be undone.
    for id in &marked_content {
        content_manager.delete_content(id)?;
    }

    let details = MarkDetails::new(snapshots, marked_content);
    let body = details.encode()?;

    // Step 3: details content before the manifest, so a reader that sees the manifest can always
    // resolve its details.
    let details_id = content_manager.write_content(&body, GC_CONTENT_PREFIX)?;

    let manifest_body = serde_json::to_vec(&MarkManifestBody {
        details_id: details_id.clone(),
    })
    .map_err(|err| GcError::integrity(format!("encoding mark manifest body: {}", err)))?;

    // Step 4: publish the manifest. If this fails the orphaned details content is left in place;
    // repair tolerates orphan details by construction.
    manifest_store.put(mark_manifest_labels(), &manifest_body)
}

/// Resolve a mark manifest's body to the `ContentId` of its companion details content.
pub fn details_id_of(manifest_body: &[u8]) -> GcResult<ContentId> {
    let body: MarkManifestBody = serde_json::from_slice(manifest_body)
        .map_err(|err| GcError::integrity(format!("decoding mark manifest body: {}", err)))?;
    Ok(body.details_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_stability() {
        let details = MarkDetails::new(
            vec![],
            vec!["x", "c", "b", "a"].into_iter().map(ContentId::from).collect(),
        );
        let ids: Vec<&str> = details.marked_content.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "x"]);
    }

    #[test]
    fn round_trip() {
        let details = MarkDetails::new(
            vec![ManifestId::from("m2"), ManifestId::from("m1")],
            vec![ContentId::from("c2"), ContentId::from("c1")],
        );
        let encoded = details.encode().unwrap();
        let decoded = MarkDetails::decode(&encoded).unwrap();
        assert_eq!(decoded, details);
    }

    #[test]
    fn decode_sorts_unsorted_input() {
        let raw = br#"{"snapshots":["m2","m1"],"markedContent":["c2","c1"]}"#;
        let decoded = MarkDetails::decode(raw).unwrap();
        assert_eq!(decoded.snapshots, vec![ManifestId::from("m1"), ManifestId::from("m2")]);
        assert_eq!(decoded.marked_content, vec![ContentId::from("c1"), ContentId::from("c2")]);
    }
}
