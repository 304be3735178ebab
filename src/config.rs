use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    dupes::{DetectionOptions, MergeOptions},
    storage::{BackendLocal, StorageManager},
};

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_DB_FILE: &str = "bookmarks.csv";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Bookmarks database, relative to the base directory unless absolute.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub detection: DetectionOptions,
    #[serde(default)]
    pub merge: MergeOptions,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

fn default_db_path() -> String {
    DEFAULT_DB_FILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            detection: DetectionOptions::default(),
            merge: MergeOptions::default(),
            base_path: String::new(),
        }
    }
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        self.detection
            .validate()
            .context("invalid detection settings in config.yaml")?;

        if self.db_path.trim().is_empty() {
            anyhow::bail!("db_path cannot be empty");
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, creating it with defaults on first run.
    /// Settings missing from an existing file are filled in and written back.
    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let store = BackendLocal::new(base_path)?;

        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;

        Ok(())
    }

    pub fn db_path(&self) -> String {
        if self.db_path.starts_with('/') || self.base_path.is_empty() {
            self.db_path.clone()
        } else {
            format!("{}/{}", self.base_path, self.db_path)
        }
    }
}
