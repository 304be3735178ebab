#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DedupError {
    #[error("cannot merge an empty set of bookmarks")]
    EmptyMergeSet,

    #[error("title similarity threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),
}
