use bbdup::bookmarks::Bookmark;
use bbdup::dupes::{
    calculate_similarity, merge_bookmarks, normalize_url, DetectionOptions, DuplicateDetector,
    MergeOptions,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

fn detection_options() -> impl Strategy<Value = DetectionOptions> {
    (
        any::<[bool; 8]>(),
        0.0f64..=1.0,
    )
        .prop_map(|(flags, threshold)| DetectionOptions {
            exact_url_matching: flags[0],
            normalized_url_matching: flags[1],
            title_similarity_matching: flags[2],
            title_similarity_threshold: threshold,
            ignore_query_params: flags[3],
            ignore_protocol: flags[4],
            ignore_www: flags[5],
            ignore_trailing_slash: flags[6],
            case_sensitive: flags[7],
        })
}

/// Urls whose trailing slash, when present, ends the string. Host labels never
/// contain `w`, so a `www.` prefix can only come from the generator.
fn url() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["http://", "https://", "HTTPS://", ""]),
        prop::bool::ANY,
        "[a-vA-V]{1,8}\\.(com|org|io)",
        prop::collection::vec("[a-zA-Z0-9_-]{1,6}", 0..3),
        prop::option::of("[a-z]{1,4}=[a-z0-9]{0,4}"),
        prop::option::of("[a-z]{1,5}"),
        prop::bool::ANY,
    )
        .prop_map(|(scheme, www, host, segments, query, fragment, slash)| {
            let mut url = format!("{scheme}{}{host}", if www { "www." } else { "" });
            for segment in segments {
                url.push('/');
                url.push_str(&segment);
            }
            match (query, fragment) {
                (None, None) if slash => url.push('/'),
                (query, fragment) => {
                    if let Some(query) = query {
                        url.push('?');
                        url.push_str(&query);
                    }
                    if let Some(fragment) = fragment {
                        url.push('#');
                        url.push_str(&fragment);
                    }
                }
            }
            url
        })
}

fn bookmark(id: u64) -> impl Strategy<Value = Bookmark> {
    (
        url(),
        "[a-zA-Z ]{0,12}",
        prop::collection::vec("[a-c]", 0..4),
        0u64..100,
        0i64..1_000,
        prop::bool::ANY,
    )
        .prop_map(move |(url, title, tags, visits, day, is_favorite)| {
            let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
            Bookmark {
                id,
                title,
                url,
                tags,
                visits,
                is_favorite,
                date_added: date,
                date_modified: date,
                ..Default::default()
            }
        })
}

fn collection() -> impl Strategy<Value = Vec<Bookmark>> {
    (0usize..16).prop_flat_map(|len| {
        (0..len as u64)
            .map(bookmark)
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn test_similarity_is_reflexive(a in bookmark(1), options in detection_options()) {
        let score = calculate_similarity(&a, &a, &options);
        prop_assert_eq!(score.exact, 1.0);
        prop_assert_eq!(score.normalized, 1.0);
        prop_assert_eq!(score.title, 1.0);
    }

    #[test]
    fn test_similarity_is_symmetric(
        a in bookmark(1),
        b in bookmark(2),
        options in detection_options(),
    ) {
        prop_assert_eq!(
            calculate_similarity(&a, &b, &options),
            calculate_similarity(&b, &a, &options)
        );
    }

    #[test]
    fn test_normalization_is_idempotent(url in url(), options in detection_options()) {
        let once = normalize_url(&url, &options).normalized;
        let twice = normalize_url(&once, &options).normalized;
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_groups_partition_ids(bmarks in collection(), options in detection_options()) {
        let report = DuplicateDetector::new().find_duplicates(&bmarks, &options);

        let mut seen = HashSet::new();
        for group in &report.groups {
            prop_assert!(group.bookmarks.len() >= 2);
            prop_assert!((0.0..=1.0).contains(&group.similarity));
            for id in group.ids() {
                prop_assert!(seen.insert(id));
            }
        }

        let grouped: usize = report.groups.iter().map(|g| g.bookmarks.len()).sum();
        prop_assert_eq!(report.total_duplicates, grouped - report.groups.len());
        prop_assert_eq!(report.scanned_count, bmarks.len());
        prop_assert!(report.exact_matches <= report.groups.len());
        prop_assert!(report.normalized_matches <= report.groups.len());
        prop_assert!(report.title_similar_matches <= report.groups.len());
    }

    #[test]
    fn test_merge_of_one_is_identity(a in bookmark(7), keep_dates in prop::option::of(Just(bbdup::dupes::DateStrategy::Last))) {
        let options = MergeOptions { keep_dates, ..Default::default() };
        prop_assert_eq!(merge_bookmarks(std::slice::from_ref(&a), &options).unwrap(), a);
    }

    #[test]
    fn test_merge_keeps_earliest_identity(bmarks in collection()) {
        prop_assume!(bmarks.len() >= 2);

        let merged = merge_bookmarks(&bmarks, &MergeOptions::default()).unwrap();
        let earliest = bmarks.iter().min_by_key(|b| b.date_added).unwrap();

        prop_assert_eq!(merged.id, earliest.id);
        prop_assert_eq!(&merged.url, &earliest.url);
        prop_assert_eq!(merged.visits, bmarks.iter().map(|b| b.visits).sum::<u64>());

        let mut sorted = merged.tags.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(merged.tags, sorted);
    }
}
