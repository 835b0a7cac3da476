// Application configuration
// Storage locations resolved from the environment, falling back to the app data dir
use std::path::PathBuf;
use thiserror::Error;

use crate::state::storage::{self, StorageError};

pub const DATA_DIR_ENV: &str = "COMPLAINT_TRACKER_DATA_DIR";
pub const DB_PATH_ENV: &str = "COMPLAINT_TRACKER_DB";
pub const BACKUP_PATH_ENV: &str = "COMPLAINT_TRACKER_BACKUP";

const DB_FILE_NAME: &str = "community_complaints.db";
const BACKUP_FILE_NAME: &str = "complaint_backup.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to read {key}: {message}")]
    Env { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub backup_path: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Ignore errors if there is no .env file
        let _ = dotenvy::dotenv();
        Self::resolve(optional_env)
    }

    /// Default file names inside `data_dir`
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            backup_path: data_dir.join(BACKUP_FILE_NAME),
            data_dir,
        }
    }

    fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        let data_dir = match lookup(DATA_DIR_ENV)? {
            Some(dir) => storage::ensure_dir(&PathBuf::from(dir))?,
            None => storage::get_app_data_dir()?,
        };

        let mut config = Self::in_dir(data_dir);
        if let Some(db_path) = lookup(DB_PATH_ENV)? {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(backup_path) = lookup(BACKUP_PATH_ENV)? {
            config.backup_path = PathBuf::from(backup_path);
        }
        Ok(config)
    }
}

fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::Env {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
