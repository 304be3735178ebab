//! Duplicate detection and merge engine.
//!
//! Pure and synchronous: every call works on the slice it is handed and keeps no
//! state between calls. Persistence and user interaction live in [`crate::app`].

mod errors;
mod grouper;
mod merge;
mod normalize;
mod similarity;
mod types;

use std::time::Instant;

use crate::bookmarks::Bookmark;

pub use errors::DedupError;
pub use grouper::{check_for_duplicate, classify, group_duplicates, ScanCounters};
pub use merge::merge_bookmarks;
pub use normalize::{normalize_url, NormalizedUrl};
pub use similarity::{calculate_similarity, title_similarity, SimilarityScore};
pub use types::{
    CustomValues, DateStrategy, DetectionOptions, DuplicateGroup, DuplicateType,
    FavoriteStrategy, MergeOptions, PickStrategy, ScanReport, TextStrategy, VisitsStrategy,
    NORMALIZED_MATCH_THRESHOLD,
};

/// Entry point for integrators. Cheap to construct, holds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDetector;

impl DuplicateDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scan a whole collection and report every duplicate group.
    pub fn find_duplicates(&self, bookmarks: &[Bookmark], options: &DetectionOptions) -> ScanReport {
        let now = Instant::now();

        let (groups, counters) = group_duplicates(bookmarks, options);
        let total_duplicates = groups.iter().map(|g| g.bookmarks.len() - 1).sum();
        let elapsed_ms = now.elapsed().as_millis() as u64;

        log::debug!(
            "scanned {} bookmarks in {}ms, {} groups",
            bookmarks.len(),
            elapsed_ms,
            groups.len()
        );

        ScanReport {
            groups,
            total_duplicates,
            exact_matches: counters.exact,
            normalized_matches: counters.normalized,
            title_similar_matches: counters.title_similar,
            scanned_count: bookmarks.len(),
            elapsed_ms,
        }
    }

    /// Existing bookmarks a new candidate would duplicate.
    pub fn check_for_duplicate(
        &self,
        candidate: &Bookmark,
        existing: &[Bookmark],
        options: &DetectionOptions,
    ) -> Vec<Bookmark> {
        check_for_duplicate(candidate, existing, options)
    }

    pub fn merge_duplicates(
        &self,
        bookmarks: &[Bookmark],
        options: &MergeOptions,
    ) -> Result<Bookmark, DedupError> {
        merge_bookmarks(bookmarks, options)
    }

    pub fn calculate_similarity(
        &self,
        a: &Bookmark,
        b: &Bookmark,
        options: &DetectionOptions,
    ) -> SimilarityScore {
        calculate_similarity(a, b, options)
    }

    pub fn default_detection_options(&self) -> DetectionOptions {
        DetectionOptions::default()
    }

    pub fn default_merge_options(&self) -> MergeOptions {
        MergeOptions::default()
    }
}
