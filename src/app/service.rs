use crate::{
    app::errors::AppError,
    bookmarks::{Bookmark, BookmarkCreate, BookmarkManager, BookmarkUpdate},
    config::Config,
    dupes::{DetectionOptions, DuplicateDetector, DuplicateGroup, MergeOptions, ScanReport},
};
use chrono::Utc;
use std::{collections::HashSet, sync::Arc};

/// What to do with a new bookmark that already has duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AddAnyway,
    Merge,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Created(Bookmark),
    /// The candidate was folded into an existing bookmark, which is returned.
    Merged(Bookmark),
    Cancelled,
}

/// Glue between the duplicate engine and bookmark storage.
///
/// The engine only computes; this is where merge results are written back. The primary
/// of a selection is its first id: it receives the merged fields and every other id
/// is deleted.
pub struct AppService {
    bmark_mgr: Arc<dyn BookmarkManager>,
    config: Config,
    detector: DuplicateDetector,
}

impl AppService {
    pub fn new(bmark_mgr: Arc<dyn BookmarkManager>, config: Config) -> Self {
        Self {
            bmark_mgr,
            config,
            detector: DuplicateDetector::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scan(&self, options: &DetectionOptions) -> Result<ScanReport, AppError> {
        let bmarks = self.bmark_mgr.list()?;
        Ok(self.detector.find_duplicates(&bmarks, options))
    }

    pub fn check(
        &self,
        candidate: &Bookmark,
        options: &DetectionOptions,
    ) -> Result<Vec<Bookmark>, AppError> {
        let bmarks = self.bmark_mgr.list()?;
        Ok(self.detector.check_for_duplicate(candidate, &bmarks, options))
    }

    /// Merge the selected bookmarks into the first one and delete the rest.
    pub fn merge_ids(&self, ids: &[u64], options: &MergeOptions) -> Result<Bookmark, AppError> {
        if ids.len() < 2 {
            return Err(AppError::NothingToMerge(ids.len()));
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                return Err(AppError::DuplicateSelection(*id));
            }
            let bmark = self.bmark_mgr.get(*id)?.ok_or(AppError::NotFound(*id))?;
            selected.push(bmark);
        }

        let merged = self.detector.merge_duplicates(&selected, options)?;

        let primary = ids[0];
        let updated = self
            .bmark_mgr
            .update(primary, BookmarkUpdate::from_merged(&merged))?;

        for id in &ids[1..] {
            self.bmark_mgr.delete(*id)?;
        }

        log::info!(
            "merged {} bookmarks into #{primary}, removed {:?}",
            ids.len(),
            &ids[1..]
        );

        Ok(updated)
    }

    pub fn merge_group(
        &self,
        group: &DuplicateGroup,
        options: &MergeOptions,
    ) -> Result<Bookmark, AppError> {
        self.merge_ids(&group.ids(), options)
    }

    /// Scan and merge every group found. Returns the surviving bookmarks.
    pub fn merge_all(
        &self,
        detection: &DetectionOptions,
        merge: &MergeOptions,
    ) -> Result<Vec<Bookmark>, AppError> {
        let report = self.scan(detection)?;
        report
            .groups
            .iter()
            .map(|group| self.merge_group(group, merge))
            .collect()
    }

    /// Add a bookmark, consulting `decide` when it duplicates existing ones.
    ///
    /// `decide` gets the candidate and its duplicates in collection order. On
    /// [`Decision::Merge`] the candidate is folded into the first duplicate and never
    /// stored on its own.
    pub fn add<F>(
        &self,
        create: BookmarkCreate,
        detection: &DetectionOptions,
        merge: &MergeOptions,
        decide: F,
    ) -> Result<AddOutcome, AppError>
    where
        F: FnOnce(&Bookmark, &[Bookmark]) -> anyhow::Result<Decision>,
    {
        let candidate = create.to_candidate(Utc::now());
        let dupes = self.check(&candidate, detection)?;

        if dupes.is_empty() {
            return Ok(AddOutcome::Created(self.bmark_mgr.create(create)?));
        }

        match decide(&candidate, &dupes)? {
            Decision::AddAnyway => Ok(AddOutcome::Created(self.bmark_mgr.create(create)?)),
            Decision::Cancel => Ok(AddOutcome::Cancelled),
            Decision::Merge => {
                let target = &dupes[0];
                let merged = self
                    .detector
                    .merge_duplicates(&[target.clone(), candidate], merge)?;
                let updated = self
                    .bmark_mgr
                    .update(target.id, BookmarkUpdate::from_merged(&merged))?;
                log::info!("merged new bookmark into #{}", target.id);
                Ok(AddOutcome::Merged(updated))
            }
        }
    }
}
