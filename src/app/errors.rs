use crate::dupes::DedupError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bookmark {0} not found")]
    NotFound(u64),

    #[error("need at least two bookmarks to merge, got {0}")]
    NothingToMerge(usize),

    #[error("bookmark {0} was selected more than once")]
    DuplicateSelection(u64),

    #[error(transparent)]
    Dedup(#[from] DedupError),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
