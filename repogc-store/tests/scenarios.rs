//! End-to-end GC scenarios, run against [`MemStore`] and [`NullWorker`].

use std::time::Duration;

use repogc_api_types::{mark_manifest_labels, ContentId, ManifestId};
use repogc_store::{run_mark, run_repair, ContentManager, ManifestStore, MemStore, NullWorker};

fn seeded_contents(store: &MemStore, n: usize) -> Vec<ContentId> {
    (0..n)
        .map(|i| {
            let id = ContentId::from(format!("c{:04}", i));
            store.seed_content(id.clone(), format!("payload-{}", i).into_bytes());
            id
        })
        .collect()
}

fn is_deleted(store: &MemStore, id: &ContentId) -> bool {
    ContentManager::content_info(store, id).unwrap().deleted
}

/// 4 contents, zero snapshots, batch_size=5, drive 3 deletions -> 1 mark manifest.
#[test]
fn small_batch_no_snapshots() {
    let store = MemStore::new();
    let contents = seeded_contents(&store, 4);
    let to_delete = contents[0..3].to_vec();

    let status = run_mark(&store, &store, &NullWorker, to_delete.into_iter(), vec![], 5).unwrap();

    assert_eq!(status.manifests_published, 1);
    assert_eq!(status.contents_marked, 3);

    for id in &contents[0..3] {
        assert!(is_deleted(&store, id));
    }
    assert!(!is_deleted(&store, &contents[3]));

    let mark_manifests = ManifestStore::find(&store, &mark_manifest_labels()).unwrap().len();
    assert_eq!(mark_manifests, 1);
}

/// 155 contents, 147 queued, batch_size=50, 3 snapshot IDs -> ceil(147/50) = 3 manifests.
#[test]
fn large_batch_boundary() {
    let store = MemStore::new();
    let contents = seeded_contents(&store, 155);
    let to_delete: Vec<ContentId> = contents[0..147].to_vec();
    let snapshots = vec![
        ManifestId::from("s1"),
        ManifestId::from("s2"),
        ManifestId::from("s3"),
    ];

    let status = run_mark(&store, &store, &NullWorker, to_delete.clone().into_iter(), snapshots, 50).unwrap();

    assert_eq!(status.manifests_published, 3);
    assert_eq!(status.contents_marked, 147);

    for id in &to_delete {
        assert!(is_deleted(&store, id));
    }
    for id in &contents[147..155] {
        assert!(!is_deleted(&store, id));
    }
}

/// Boundary where the candidate count equals batch_size exactly: still just one manifest.
#[test]
fn exact_batch_boundary() {
    let store = MemStore::new();
    let contents = seeded_contents(&store, 12);
    let to_delete: Vec<ContentId> = contents[0..10].to_vec();

    let status = run_mark(&store, &store, &NullWorker, to_delete.into_iter(), vec![], 10).unwrap();

    assert_eq!(status.manifests_published, 1);
}

/// Mark content c, then a new snapshot references it after the quarantine window passes; repair
/// must undelete c, and purge the mark manifest and its details content.
#[test]
fn repair_undeletes_reused_content() {
    let store = MemStore::new();
    let contents = seeded_contents(&store, 1);
    let c = contents[0].clone();

    run_mark(&store, &store, &NullWorker, vec![c.clone()].into_iter(), vec![], 10).unwrap();
    assert!(is_deleted(&store, &c));

    // A snapshot not visible to the mark pass references c.
    store.fake_snapshot(vec![c.clone()]);

    // Backdate the mark manifest so it clears the quarantine window.
    store.age_all_manifests(Duration::from_secs(3600));

    let status = run_repair(&store, &store, &store, &NullWorker, Duration::from_secs(60)).unwrap();

    assert_eq!(status.marks_inspected, 1);
    assert_eq!(status.marks_purged, 1);
    assert_eq!(status.contents_undeleted, 1);
    assert!(!is_deleted(&store, &c));

    let remaining_marks = ManifestStore::find(&store, &mark_manifest_labels()).unwrap().len();
    assert_eq!(remaining_marks, 0);
}

/// Repair never purges a manifest younger than min_gc_mark_age.
#[test]
fn quarantine_is_respected() {
    let store = MemStore::new();
    let contents = seeded_contents(&store, 1);
    let c = contents[0].clone();

    run_mark(&store, &store, &NullWorker, vec![c].into_iter(), vec![], 10).unwrap();

    let status = run_repair(&store, &store, &store, &NullWorker, Duration::from_secs(3600)).unwrap();

    assert_eq!(status.marks_inspected, 0);
    assert_eq!(status.marks_purged, 0);
}
