use super::{bmark, day};
use crate::app::{AddOutcome, AppError, AppService, Decision};
use crate::bookmarks::{BackendCsv, Bookmark, BookmarkCreate, BookmarkManager};
use crate::config::Config;
use crate::dupes::{DedupError, DetectionOptions, MergeOptions};
use std::sync::Arc;

fn service_with(bmarks: Vec<Bookmark>) -> (AppService, Arc<BackendCsv>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let csv_path = tmp.path().join("bookmarks.csv");
    let mgr = Arc::new(BackendCsv::load(csv_path.to_str().unwrap()).unwrap());
    for bmark in bmarks {
        mgr.insert(bmark).unwrap();
    }
    let service = AppService::new(mgr.clone(), Config::default());
    (service, mgr, tmp)
}

fn ids(mgr: &BackendCsv) -> Vec<u64> {
    mgr.list().unwrap().iter().map(|b| b.id).collect()
}

#[test]
fn merge_writes_to_first_selected_and_deletes_the_rest() {
    let (service, mgr, _tmp) = service_with(vec![
        Bookmark {
            visits: 5,
            tags: vec!["a".into()],
            ..bmark(1, "https://example.com", "Example")
        },
        Bookmark {
            visits: 3,
            tags: vec!["b".into()],
            ..bmark(2, "http://www.example.com/", "Example Domain")
        },
        Bookmark {
            visits: 10,
            tags: vec!["c".into()],
            ..bmark(3, "https://example.com/", "Ex")
        },
        bmark(4, "https://unrelated.org", "Unrelated"),
    ]);

    // primary is the first id in selection order, not the oldest
    let merged = service.merge_ids(&[2, 1, 3], &MergeOptions::default()).unwrap();

    assert_eq!(merged.id, 2);
    assert_eq!(merged.url, "https://example.com");
    assert_eq!(merged.title, "Example Domain");
    assert_eq!(merged.visits, 18);
    assert_eq!(merged.tags, vec!["a", "b", "c"]);
    assert_eq!(merged.date_added, day(1));

    assert_eq!(ids(&mgr), vec![2, 4]);
    assert_eq!(mgr.get(2).unwrap(), Some(merged));
}

#[test]
fn merge_needs_two_ids() {
    let (service, _mgr, _tmp) = service_with(vec![bmark(1, "https://a.com", "A")]);
    let err = service.merge_ids(&[1], &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::NothingToMerge(1)));
}

#[test]
fn merge_fails_fast_on_unknown_id() {
    let (service, mgr, _tmp) = service_with(vec![
        bmark(1, "https://a.com", "A"),
        bmark(2, "https://a.com", "A"),
    ]);

    let err = service.merge_ids(&[1, 2, 9], &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::NotFound(9)));
    // nothing was touched
    assert_eq!(ids(&mgr), vec![1, 2]);
}

#[test]
fn merge_rejects_repeated_ids() {
    let (service, _mgr, _tmp) = service_with(vec![
        bmark(1, "https://a.com", "A"),
        bmark(2, "https://a.com", "A"),
    ]);
    let err = service.merge_ids(&[1, 2, 1], &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::DuplicateSelection(1)));
}

#[test]
fn scan_then_merge_all() {
    let (service, mgr, _tmp) = service_with(vec![
        bmark(1, "https://example.com", "Example"),
        bmark(2, "https://docs.rs", "Docs"),
        bmark(3, "http://example.com/", "Example site"),
        bmark(4, "https://docs.rs/", "Docs.rs"),
        bmark(5, "https://crates.io", "Crates"),
    ]);

    let report = service.scan(&DetectionOptions::default()).unwrap();
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.total_duplicates, 2);

    let survivors = service
        .merge_all(&DetectionOptions::default(), &MergeOptions::default())
        .unwrap();
    assert_eq!(survivors.len(), 2);
    assert_eq!(ids(&mgr), vec![1, 2, 5]);

    let report = service.scan(&DetectionOptions::default()).unwrap();
    assert!(report.groups.is_empty());
}

#[test]
fn add_without_duplicates_creates() {
    let (service, mgr, _tmp) = service_with(vec![bmark(1, "https://a.com", "A")]);

    let outcome = service
        .add(
            BookmarkCreate {
                url: "https://b.com".into(),
                title: Some("Bee".into()),
                ..Default::default()
            },
            &DetectionOptions::default(),
            &MergeOptions::default(),
            |_, _| panic!("no decision needed"),
        )
        .unwrap();

    assert!(matches!(outcome, AddOutcome::Created(ref b) if b.id == 2));
    assert_eq!(ids(&mgr), vec![1, 2]);
}

#[test]
fn add_duplicate_decisions() {
    let existing = || {
        vec![Bookmark {
            visits: 4,
            tags: vec!["old".into()],
            ..bmark(1, "https://example.com/", "Example")
        }]
    };
    let create = || BookmarkCreate {
        url: "http://www.example.com".into(),
        title: Some("Example, the site".into()),
        tags: Some(vec!["new".into()]),
        ..Default::default()
    };
    let opts = DetectionOptions::default();
    let merge = MergeOptions::default();

    // cancel leaves storage alone
    let (service, mgr, _tmp) = service_with(existing());
    let outcome = service
        .add(create(), &opts, &merge, |candidate, dupes| {
            assert_eq!(candidate.url, "http://www.example.com");
            assert_eq!(dupes.len(), 1);
            Ok(Decision::Cancel)
        })
        .unwrap();
    assert_eq!(outcome, AddOutcome::Cancelled);
    assert_eq!(ids(&mgr), vec![1]);

    // add anyway stores a second record
    let (service, mgr, _tmp) = service_with(existing());
    let outcome = service
        .add(create(), &opts, &merge, |_, _| Ok(Decision::AddAnyway))
        .unwrap();
    assert!(matches!(outcome, AddOutcome::Created(_)));
    assert_eq!(ids(&mgr), vec![1, 2]);

    // merge folds the candidate into the existing record
    let (service, mgr, _tmp) = service_with(existing());
    let outcome = service
        .add(create(), &opts, &merge, |_, _| Ok(Decision::Merge))
        .unwrap();
    let AddOutcome::Merged(merged) = outcome else {
        panic!("expected a merge");
    };
    assert_eq!(merged.id, 1);
    assert_eq!(merged.url, "https://example.com/");
    assert_eq!(merged.title, "Example, the site");
    assert_eq!(merged.tags, vec!["new", "old"]);
    assert_eq!(merged.visits, 4);
    assert_eq!(ids(&mgr), vec![1]);
}

#[test]
fn decision_errors_propagate() {
    let (service, _mgr, _tmp) = service_with(vec![bmark(1, "https://a.com", "A")]);
    let err = service
        .add(
            BookmarkCreate {
                url: "https://a.com".into(),
                ..Default::default()
            },
            &DetectionOptions::default(),
            &MergeOptions::default(),
            |_, _| Err(anyhow::anyhow!("prompt closed")),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Other(_)));
}

#[test]
fn engine_errors_are_wrapped() {
    let err: AppError = DedupError::EmptyMergeSet.into();
    assert!(matches!(err, AppError::Dedup(DedupError::EmptyMergeSet)));
    assert_eq!(err.to_string(), "cannot merge an empty set of bookmarks");
}
