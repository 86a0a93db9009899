use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::RotationError;

/// Configuration for one backup run, read from environment variables once
/// at startup and immutable thereafter.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory the external archiver snapshots; its basename names the
    /// artifacts. `PROJECT_PATH` (required).
    pub project_path: PathBuf,
    /// Drive folder holding the remote backups. `GDRIVE_FOLDER_ID`
    /// (required).
    pub folder_id: String,
    /// Bearer token for the Drive API; acquisition and refresh are
    /// external. `GDRIVE_ACCESS_TOKEN` (required).
    pub access_token: String,
    /// The single GFS parameter: days kept, weekly anchors kept, monthly
    /// anchors kept. Widening one window widens all three.
    /// `RETENTION` (default: 7).
    pub retention: u32,
    /// Directory holding the local archives. `BACKUP_DIR` (default:
    /// `backups/`).
    pub backup_dir: PathBuf,
    /// Webhook notification target. `WEBHOOK_URL`; consulted only when
    /// `USE_WEBHOOK` is truthy (default: off).
    pub webhook_url: Option<String>,
    pub use_webhook: bool,
    /// Reference date override for deterministic runs. `BACKUP_DATE`
    /// (`YYYY-MM-DD`); defaults to the current local date.
    pub today: Option<NaiveDate>,
}

impl BackupConfig {
    /// Read configuration from environment variables. Missing required
    /// identifiers or unparseable values are fatal before any catalog
    /// work.
    pub fn from_env() -> Result<Self, RotationError> {
        Ok(Self {
            project_path: PathBuf::from(require_env("PROJECT_PATH")?),
            folder_id: require_env("GDRIVE_FOLDER_ID")?,
            access_token: require_env("GDRIVE_ACCESS_TOKEN")?,
            retention: parse_env_u32("RETENTION", 7)?,
            backup_dir: PathBuf::from(
                std::env::var("BACKUP_DIR").unwrap_or_else(|_| "backups/".to_string()),
            ),
            webhook_url: std::env::var("WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            use_webhook: std::env::var("USE_WEBHOOK")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
            today: parse_env_date("BACKUP_DATE")?,
        })
    }

    /// Basename of the project directory, used in archive filenames.
    pub fn project_name(&self) -> Result<String, RotationError> {
        self.project_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RotationError::Configuration(format!(
                    "PROJECT_PATH has no basename: {}",
                    self.project_path.display()
                ))
            })
    }

    /// Reference date for every retention decision of the run.
    pub fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

fn require_env(key: &str) -> Result<String, RotationError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(RotationError::Configuration(format!("{key} is required"))),
    }
}

fn parse_env_u32(key: &str, default: u32) -> Result<u32, RotationError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|err| RotationError::Configuration(format!("invalid {key}: {err}"))),
        _ => Ok(default),
    }
}

fn parse_env_date(key: &str) -> Result<Option<NaiveDate>, RotationError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Some)
            .map_err(|err| RotationError::Configuration(format!("invalid {key}: {err}"))),
        _ => Ok(None),
    }
}
