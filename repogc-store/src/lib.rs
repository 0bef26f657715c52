//! Committed-content index cache and garbage-collection core.
//!
//! # Garbage collection
//!
//! GC runs in two phases, well separated in time by a quarantine window.
//!
//! The **mark phase** ([`mark_driver`]) walks a stream of content IDs that look unreachable,
//! flips their `deleted` flag, and writes the decision down durably in fixed-size batches
//! ([`mark_manifest`]) so a later phase can re-check the decision instead of trusting it forever.
//!
//! The **repair-and-purge phase** ([`repair`]) revisits those batches once they are older than a
//! caller-supplied minimum age, checks whether any snapshot published since the mark still
//! references the marked content, undeletes anything it does, and finalizes everything else.
//!
//! Both phases depend on a local [`disk_index_cache`] of the content manager's index blobs so
//! repeated reachability checks don't refetch the same immutable blob from the object store.
//! Everything either phase needs from the wider repository — the blob store, the content
//! manager, the manifest store, the snapshot walker — is expressed as a trait in
//! [`collaborators`]; [`memstore`] is the one concrete backend this crate ships.

pub mod collaborators;
pub mod disk_index_cache;
pub mod error;
pub mod index_reader;
pub mod mark_driver;
pub mod mark_manifest;
pub mod memstore;
pub mod repair;
pub mod task;

pub use collaborators::{BlobStore, ContentInfo, ContentManager, ManifestEntry, ManifestStore, SnapshotEntry, SnapshotWalker};
pub use disk_index_cache::DiskIndexCache;
pub use error::{GcError, GcResult};
pub use index_reader::{IndexReader, IndexRecord};
pub use mark_driver::run_mark;
pub use mark_manifest::{publish_mark, MarkDetails};
pub use memstore::MemStore;
pub use repair::run_repair;
pub use task::{GcWorker, NullWorker};
