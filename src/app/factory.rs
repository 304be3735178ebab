use crate::{app::service::AppService, bookmarks::BackendCsv, config::Config};
use anyhow::{Context, Result};
use homedir::my_home;
use std::sync::Arc;

/// Application factory for creating and configuring application components
pub struct AppFactory;

impl AppFactory {
    /// Load config and the bookmarks database found under `paths`.
    pub fn create_app_service(paths: &AppPaths) -> Result<AppService> {
        let config = Config::load_with(&paths.base_path)?;
        let db_path = config.db_path();

        let bmark_mgr = BackendCsv::load(&db_path)
            .with_context(|| format!("Failed to load bookmarks from {db_path}"))?;

        Ok(AppService::new(Arc::new(bmark_mgr), config))
    }

    /// Resolve the base directory: explicit override, then `BBDUP_BASE_PATH`,
    /// then `~/.local/share/bbdup`.
    pub fn get_paths(base_override: Option<String>) -> Result<AppPaths> {
        let base_path = match base_override {
            Some(path) => path,
            None => Self::get_base_path()?,
        };

        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths { base_path })
    }

    fn get_base_path() -> Result<String> {
        if let Ok(base_path) = std::env::var("BBDUP_BASE_PATH") {
            return Ok(base_path);
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;
        Ok(format!("{}/.local/share/bbdup", home.to_string_lossy()))
    }
}

/// Application paths structure
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_path: String,
}
