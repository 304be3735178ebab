mod app;

use crate::bookmarks::Bookmark;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// 2024-01-01 plus `days`.
pub fn day(days: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)
}

pub fn bmark(id: u64, url: &str, title: &str) -> Bookmark {
    Bookmark {
        id,
        url: url.to_string(),
        title: title.to_string(),
        date_added: day(id as i64),
        date_modified: day(id as i64),
        ..Default::default()
    }
}
