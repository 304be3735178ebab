use serde::{Deserialize, Serialize};

use crate::bookmarks::Bookmark;

use super::normalize::normalize_url;
use super::types::DetectionOptions;

const EXACT_WEIGHT: f64 = 0.5;
const NORMALIZED_WEIGHT: f64 = 0.3;
const TITLE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// 1.0 when the raw urls are identical.
    pub exact: f64,
    /// 1.0 when the normalized urls are identical.
    pub normalized: f64,
    /// Edit-distance similarity of the titles in [0.0, 1.0].
    pub title: f64,
}

impl SimilarityScore {
    pub fn overall(&self) -> f64 {
        EXACT_WEIGHT * self.exact + NORMALIZED_WEIGHT * self.normalized + TITLE_WEIGHT * self.title
    }
}

/// Compare two bookmarks on raw url, normalized url and title.
pub fn calculate_similarity(a: &Bookmark, b: &Bookmark, options: &DetectionOptions) -> SimilarityScore {
    let exact = if a.url == b.url { 1.0 } else { 0.0 };

    let normalized = if normalize_url(&a.url, options).normalized
        == normalize_url(&b.url, options).normalized
    {
        1.0
    } else {
        0.0
    };

    SimilarityScore {
        exact,
        normalized,
        title: title_similarity(&a.title, &b.title, options.case_sensitive),
    }
}

/// `(max_len - distance) / max_len` over the Levenshtein distance of the two titles,
/// counted in chars.
pub fn title_similarity(a: &str, b: &str, case_sensitive: bool) -> f64 {
    let (a, b) = if case_sensitive {
        (a.to_string(), b.to_string())
    } else {
        (a.to_lowercase(), b.to_lowercase())
    };

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}
