use std::collections::BTreeSet;

use chrono::Utc;

use crate::bookmarks::Bookmark;

use super::errors::DedupError;
use super::types::{
    DateStrategy, FavoriteStrategy, MergeOptions, PickStrategy, TextStrategy, VisitsStrategy,
};

/// Collapse `bookmarks` into one canonical record.
///
/// Members are ordered by `date_added` (stable, so ties keep input order). The earliest
/// one is `first`, the latest `last`. The canonical id and url always come from `first`;
/// every other field follows its strategy in `options`.
///
/// A single bookmark is returned untouched.
pub fn merge_bookmarks(
    bookmarks: &[Bookmark],
    options: &MergeOptions,
) -> Result<Bookmark, DedupError> {
    match bookmarks {
        [] => return Err(DedupError::EmptyMergeSet),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    let mut sorted: Vec<&Bookmark> = bookmarks.iter().collect();
    sorted.sort_by_key(|b| b.date_added);

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];

    let title = match options.keep_title {
        TextStrategy::First => first.title.clone(),
        TextStrategy::Last => last.title.clone(),
        TextStrategy::Longest => longest_by(&sorted, |b| b.title.chars().count())
            .title
            .clone(),
        TextStrategy::Custom => options
            .custom
            .title
            .clone()
            .unwrap_or_else(|| first.title.clone()),
    };

    let description = match options.keep_description {
        TextStrategy::First => first.description.clone(),
        TextStrategy::Last => last.description.clone(),
        TextStrategy::Longest => longest_by(&sorted, |b| {
            b.description.as_deref().unwrap_or_default().chars().count()
        })
        .description
        .clone(),
        TextStrategy::Custom => options
            .custom
            .description
            .clone()
            .or_else(|| first.description.clone()),
    };

    let category = match options.keep_category {
        PickStrategy::First => first.category.clone(),
        PickStrategy::Last => last.category.clone(),
        PickStrategy::Custom => options
            .custom
            .category
            .clone()
            .unwrap_or_else(|| first.category.clone()),
    };

    let favicon = match options.keep_favicon {
        PickStrategy::First => first.favicon.clone(),
        PickStrategy::Last => last.favicon.clone(),
        PickStrategy::Custom => options
            .custom
            .favicon
            .clone()
            .or_else(|| first.favicon.clone()),
    };

    let tags = if options.combine_tags {
        sorted
            .iter()
            .flat_map(|b| b.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        first.tags.clone()
    };

    let is_favorite = match options.keep_favorite {
        FavoriteStrategy::Any => sorted.iter().any(|b| b.is_favorite),
        FavoriteStrategy::All => sorted.iter().all(|b| b.is_favorite),
        FavoriteStrategy::First => first.is_favorite,
        FavoriteStrategy::Last => last.is_favorite,
    };

    let visits = match options.keep_visits {
        VisitsStrategy::Sum => sorted.iter().map(|b| b.visits).fold(0, u64::saturating_add),
        VisitsStrategy::Max => sorted.iter().map(|b| b.visits).max().unwrap_or_default(),
        VisitsStrategy::First => first.visits,
        VisitsStrategy::Last => last.visits,
    };

    let (date_added, date_modified) = match options.keep_dates {
        Some(DateStrategy::Earliest) => (
            sorted.iter().map(|b| b.date_added).min().unwrap_or(first.date_added),
            sorted
                .iter()
                .map(|b| b.date_modified)
                .min()
                .unwrap_or(first.date_modified),
        ),
        Some(DateStrategy::Latest) => (
            sorted.iter().map(|b| b.date_added).max().unwrap_or(last.date_added),
            sorted
                .iter()
                .map(|b| b.date_modified)
                .max()
                .unwrap_or(last.date_modified),
        ),
        Some(DateStrategy::First) => (first.date_added, first.date_modified),
        Some(DateStrategy::Last) => (last.date_added, last.date_modified),
        None => (first.date_added, Utc::now()),
    };

    log::debug!(
        "merged {} bookmarks into #{} ({} tags, {} visits)",
        bookmarks.len(),
        first.id,
        tags.len(),
        visits
    );

    Ok(Bookmark {
        id: first.id,
        url: first.url.clone(),
        title,
        description,
        category,
        tags,
        is_favorite,
        date_added,
        date_modified,
        visits,
        favicon,
    })
}

/// Member with the greatest `len`, the earliest one winning ties.
fn longest_by<'a>(sorted: &[&'a Bookmark], len: impl Fn(&Bookmark) -> usize) -> &'a Bookmark {
    let mut best = sorted[0];
    for &bmark in &sorted[1..] {
        if len(bmark) > len(best) {
            best = bmark;
        }
    }
    best
}
