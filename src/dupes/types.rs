use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bookmarks::Bookmark;
use crate::eid::Eid;

use super::errors::DedupError;

/// Threshold a normalized-url comparison must reach to absorb a bookmark into a cluster.
pub const NORMALIZED_MATCH_THRESHOLD: f64 = 0.95;

const DEFAULT_TITLE_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Which rules run during detection and how urls are canonicalized before comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionOptions {
    pub exact_url_matching: bool,
    pub normalized_url_matching: bool,
    pub title_similarity_matching: bool,

    /// Minimum title similarity in [0.0, 1.0]. Never clamped by the engine.
    pub title_similarity_threshold: f64,

    pub ignore_query_params: bool,
    pub ignore_protocol: bool,
    pub ignore_www: bool,
    pub ignore_trailing_slash: bool,
    pub case_sensitive: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            exact_url_matching: true,
            normalized_url_matching: true,
            title_similarity_matching: true,
            title_similarity_threshold: DEFAULT_TITLE_SIMILARITY_THRESHOLD,
            ignore_query_params: false,
            ignore_protocol: true,
            ignore_www: true,
            ignore_trailing_slash: true,
            case_sensitive: false,
        }
    }
}

impl DetectionOptions {
    /// Rejects a title threshold outside [0.0, 1.0].
    pub fn validate(&self) -> Result<(), DedupError> {
        let threshold = self.title_similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DedupError::InvalidThreshold(threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DuplicateType {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "normalized")]
    Normalized,
    #[serde(rename = "title-similar")]
    TitleSimilar,
}

impl DuplicateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateType::Exact => "exact",
            DuplicateType::Normalized => "normalized",
            DuplicateType::TitleSimilar => "title-similar",
        }
    }
}

impl std::fmt::Display for DuplicateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: Eid,
    pub url: String,
    pub normalized_url: String,
    /// Members in scan order, anchor first. Always at least two.
    pub bookmarks: Vec<Bookmark>,
    pub similarity: f64,
    pub duplicate_type: DuplicateType,
    pub detected_at: DateTime<Utc>,
}

impl DuplicateGroup {
    pub fn ids(&self) -> Vec<u64> {
        self.bookmarks.iter().map(|b| b.id).collect()
    }
}

/// Result of a batch scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub groups: Vec<DuplicateGroup>,
    /// Records that would disappear if every group were merged.
    pub total_duplicates: usize,
    pub exact_matches: usize,
    pub normalized_matches: usize,
    pub title_similar_matches: usize,
    pub scanned_count: usize,
    pub elapsed_ms: u64,
}

/// Title and description selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStrategy {
    First,
    Last,
    #[default]
    Longest,
    Custom,
}

/// Category and favicon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStrategy {
    #[default]
    First,
    Last,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteStrategy {
    #[default]
    Any,
    All,
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitsStrategy {
    #[default]
    Sum,
    Max,
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStrategy {
    Earliest,
    Latest,
    First,
    Last,
}

/// Overrides consulted by the `custom` strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Per-field conflict resolution policy used when collapsing a group.
///
/// `first` and `last` always refer to the earliest and latest member by `date_added`,
/// never to the order the members were passed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeOptions {
    pub keep_title: TextStrategy,
    pub keep_description: TextStrategy,
    pub keep_category: PickStrategy,
    pub keep_favicon: PickStrategy,
    pub combine_tags: bool,
    pub keep_favorite: FavoriteStrategy,
    pub keep_visits: VisitsStrategy,

    /// `None` keeps `date_added` of the earliest member and stamps `date_modified` with now.
    pub keep_dates: Option<DateStrategy>,

    pub custom: CustomValues,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            keep_title: TextStrategy::Longest,
            keep_description: TextStrategy::Longest,
            keep_category: PickStrategy::First,
            keep_favicon: PickStrategy::First,
            combine_tags: true,
            keep_favorite: FavoriteStrategy::Any,
            keep_visits: VisitsStrategy::Sum,
            keep_dates: Some(DateStrategy::Earliest),
            custom: CustomValues::default(),
        }
    }
}
