use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    BlobId,
    "Opaque, lexicographically orderable name of an immutable blob in the object store."
);

opaque_id!(
    ContentId,
    "Opaque identifier of a content item inside the content-addressed store. Total order is plain lexicographic byte order on the inner string, which is what every sort in this crate relies on."
);

opaque_id!(ManifestId, "Opaque name of a manifest-store document.");

/// Sort content IDs into the canonical ascending order mark-details bodies use.
pub fn sort_content_ids(ids: &mut [ContentId]) {
    ids.sort();
}

/// Sort manifest IDs into canonical ascending order.
pub fn sort_manifest_ids(ids: &mut [ManifestId]) {
    ids.sort();
}
