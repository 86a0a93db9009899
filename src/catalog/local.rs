use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use super::{BackupArtifact, BackupCatalog, CatalogListing};
use crate::error::RotationError;

/// Backup artifacts in a local directory, dated by filename.
///
/// Expected shape: `<name>_<YYYY-MM-DD>.<ext>`. Anything else (including
/// subdirectories) is skipped, never an error.
#[derive(Debug)]
pub struct LocalCatalog {
    dir: PathBuf,
}

impl LocalCatalog {
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

/// Derive the creation date from a backup filename: the segment after the
/// first `_`, up to its first `.`.
fn artifact_date(name: &str) -> Result<NaiveDate, RotationError> {
    let (_, rest) = name.split_once('_').ok_or_else(|| RotationError::Parse {
        name: name.to_string(),
        reason: "no '_' separator in filename".to_string(),
    })?;
    let date_part = rest.split('.').next().unwrap_or(rest);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|err| RotationError::Parse {
        name: name.to_string(),
        reason: format!("bad date {date_part:?}: {err}"),
    })
}

#[async_trait]
impl BackupCatalog for LocalCatalog {
    fn label(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> Result<CatalogListing, RotationError> {
        let enumeration_error = |err: std::io::Error| RotationError::Enumeration {
            catalog: "local",
            source: anyhow::Error::new(err)
                .context(format!("reading backup dir {}", self.dir.display())),
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(&enumeration_error)?;
        let mut listing = CatalogListing::default();

        while let Some(entry) = entries.next_entry().await.map_err(&enumeration_error)? {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match artifact_date(&name) {
                Ok(created) => listing.artifacts.push(BackupArtifact {
                    id: entry.path().to_string_lossy().into_owned(),
                    name,
                    created,
                }),
                Err(err) => {
                    warn!(file = %name, error = %err, "skipping file without a parseable backup date");
                    listing.skipped.push(name);
                }
            }
        }
        Ok(listing)
    }

    async fn delete(&self, artifact: &BackupArtifact) -> Result<(), RotationError> {
        tokio::fs::remove_file(&artifact.id)
            .await
            .map_err(|err| RotationError::Deletion {
                name: artifact.name.clone(),
                source: anyhow::Error::new(err).context(format!("removing {}", artifact.id)),
            })
    }
}
