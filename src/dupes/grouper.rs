use chrono::Utc;

use crate::bookmarks::Bookmark;
use crate::eid::Eid;

use super::normalize::normalize_url;
use super::similarity::{calculate_similarity, SimilarityScore};
use super::types::{DetectionOptions, DuplicateGroup, DuplicateType, NORMALIZED_MATCH_THRESHOLD};

/// Number of groups in which each rule fired at least once.
/// A group can count towards several rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    pub exact: usize,
    pub normalized: usize,
    pub title_similar: usize,
}

/// First enabled rule the pair satisfies, checked exact, normalized, then title.
pub fn classify(score: &SimilarityScore, options: &DetectionOptions) -> Option<DuplicateType> {
    if options.exact_url_matching && score.exact == 1.0 {
        Some(DuplicateType::Exact)
    } else if options.normalized_url_matching && score.normalized >= NORMALIZED_MATCH_THRESHOLD {
        Some(DuplicateType::Normalized)
    } else if options.title_similarity_matching
        && score.title >= options.title_similarity_threshold
    {
        Some(DuplicateType::TitleSimilar)
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct Cluster {
    members: Vec<usize>,
    exact: bool,
    normalized: bool,
    title_similar: bool,
    similarity: f64,
}

impl Cluster {
    fn new(anchor: usize) -> Self {
        Self {
            members: vec![anchor],
            ..Default::default()
        }
    }

    fn absorb(&mut self, idx: usize, rule: DuplicateType, score: &SimilarityScore) {
        self.members.push(idx);
        let evidence = match rule {
            DuplicateType::Exact => {
                self.exact = true;
                score.exact
            }
            DuplicateType::Normalized => {
                self.normalized = true;
                score.normalized
            }
            DuplicateType::TitleSimilar => {
                self.title_similar = true;
                score.title
            }
        };
        self.similarity = self.similarity.max(evidence);
    }

    /// Strongest rule that fired anywhere in the cluster.
    fn duplicate_type(&self) -> DuplicateType {
        if self.exact {
            DuplicateType::Exact
        } else if self.normalized {
            DuplicateType::Normalized
        } else {
            DuplicateType::TitleSimilar
        }
    }
}

/// Partition `bookmarks` into duplicate groups in a single forward pass.
///
/// Each unassigned bookmark anchors a cluster and absorbs every later unassigned
/// bookmark it matches. Absorbed bookmarks never anchor or join another cluster,
/// so no id lands in two groups. Clusters of one are dropped.
///
/// Runs O(n²) comparisons, fine for a personal collection but worth moving off the
/// UI thread for thousands of bookmarks.
pub fn group_duplicates(
    bookmarks: &[Bookmark],
    options: &DetectionOptions,
) -> (Vec<DuplicateGroup>, ScanCounters) {
    let mut assigned = vec![false; bookmarks.len()];
    let mut groups = vec![];
    let mut counters = ScanCounters::default();

    for i in 0..bookmarks.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;

        let mut cluster = Cluster::new(i);
        for j in (i + 1)..bookmarks.len() {
            if assigned[j] {
                continue;
            }

            let score = calculate_similarity(&bookmarks[i], &bookmarks[j], options);
            if let Some(rule) = classify(&score, options) {
                assigned[j] = true;
                cluster.absorb(j, rule, &score);
            }
        }

        if cluster.members.len() < 2 {
            continue;
        }

        if cluster.exact {
            counters.exact += 1;
        }
        if cluster.normalized {
            counters.normalized += 1;
        }
        if cluster.title_similar {
            counters.title_similar += 1;
        }

        let anchor = &bookmarks[i];
        groups.push(DuplicateGroup {
            id: Eid::new(),
            url: anchor.url.clone(),
            normalized_url: normalize_url(&anchor.url, options).normalized,
            bookmarks: cluster
                .members
                .iter()
                .map(|idx| bookmarks[*idx].clone())
                .collect(),
            similarity: cluster.similarity,
            duplicate_type: cluster.duplicate_type(),
            detected_at: Utc::now(),
        });
    }

    (groups, counters)
}

/// Every bookmark in `existing` that `candidate` matches under any enabled rule,
/// in input order. No clustering takes place.
pub fn check_for_duplicate(
    candidate: &Bookmark,
    existing: &[Bookmark],
    options: &DetectionOptions,
) -> Vec<Bookmark> {
    existing
        .iter()
        .filter(|bmark| {
            let score = calculate_similarity(candidate, bmark, options);
            classify(&score, options).is_some()
        })
        .cloned()
        .collect()
}
