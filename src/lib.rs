pub mod app;
pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod dupes;
pub mod eid;
pub mod logging;
pub mod storage;
#[cfg(test)]
mod tests;

pub fn parse_tags(tags: String) -> Vec<String> {
    tags.split(',')
        .flat_map(|value| value.split(' ').filter(|value| !value.is_empty()))
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
}
