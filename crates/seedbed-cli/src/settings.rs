//! CLI settings
//!
//! Layered with the `config` crate, later layers winning:
//! 1. built-in defaults
//! 2. `seedbed.toml` in the working directory, or the `--config` file
//! 3. `SEEDBED_*` environment variables (`.env` is loaded first)
//! 4. the `--db` flag
//!
//! `SEEDBED_CAPABILITIES` is a comma-separated list.

use anyhow::{anyhow, Context};
use config::{Config, Environment, File};
use rusqlite::Connection;
use seedbed_core::logging_facility::Profile;
use seedbed_core::{Capabilities, ImporterRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "seedbed.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_path: PathBuf,
    /// Where uploads are staged; the system temp directory if unset
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    pub log_profile: String,
    /// Host capabilities that enable conditional importers
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Jobs run by `queue run` when no limit is given
    pub worker_batch_size: usize,
}

impl Settings {
    pub fn load(config_file: Option<&Path>, db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut settings: Settings = Config::builder()
            .set_default("database_path", ".seedbed/seedbed.db")?
            .set_default("log_profile", "production")?
            .set_default("capabilities", Vec::<String>::new())?
            .set_default("worker_batch_size", 25)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("SEEDBED")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("capabilities"),
            )
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if let Some(db) = db_override {
            settings.database_path = db;
        }
        Ok(settings)
    }

    pub fn profile(&self) -> anyhow::Result<Profile> {
        self.log_profile.parse().map_err(|e: String| anyhow!(e))
    }

    /// Open the configured database, creating and migrating it if needed
    pub fn open_db(&self) -> anyhow::Result<Connection> {
        seedbed_store::db::open_and_migrate(&self.database_path)
            .with_context(|| format!("Cannot open database {}", self.database_path.display()))
    }

    pub fn registry(&self) -> ImporterRegistry {
        let capabilities: Capabilities = self.capabilities.iter().cloned().collect();
        ImporterRegistry::builtin(&capabilities)
    }
}
