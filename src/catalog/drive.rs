use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use tracing::warn;

use super::{BackupArtifact, BackupCatalog, CatalogListing};
use crate::drive::DriveFiles;
use crate::error::RotationError;

/// Backup artifacts in one Drive folder, dated by the server's
/// `createdTime`. Only the date component participates in retention.
pub struct DriveCatalog {
    client: Arc<dyn DriveFiles>,
    folder_id: String,
}

impl std::fmt::Debug for DriveCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveCatalog")
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

impl DriveCatalog {
    pub fn new(client: Arc<dyn DriveFiles>, folder_id: impl Into<String>) -> Self {
        Self { client, folder_id: folder_id.into() }
    }
}

fn created_date(name: &str, created_time: &str) -> Result<NaiveDate, RotationError> {
    DateTime::parse_from_rfc3339(created_time)
        .map(|ts| ts.date_naive())
        .map_err(|err| RotationError::Parse {
            name: name.to_string(),
            reason: format!("bad createdTime {created_time:?}: {err}"),
        })
}

#[async_trait]
impl BackupCatalog for DriveCatalog {
    fn label(&self) -> &'static str {
        "drive"
    }

    async fn list(&self) -> Result<CatalogListing, RotationError> {
        let files = self
            .client
            .list_children(&self.folder_id)
            .await
            .map_err(|source| RotationError::Enumeration { catalog: "drive", source })?;

        let mut listing = CatalogListing::default();
        for file in files {
            match created_date(&file.name, &file.created_time) {
                Ok(created) => listing.artifacts.push(BackupArtifact {
                    id: file.id,
                    name: file.name,
                    created,
                }),
                Err(err) => {
                    warn!(file = %file.name, error = %err, "skipping remote object without a parseable createdTime");
                    listing.skipped.push(file.name);
                }
            }
        }
        Ok(listing)
    }

    async fn delete(&self, artifact: &BackupArtifact) -> Result<(), RotationError> {
        self.client
            .delete_file(&artifact.id)
            .await
            .map_err(|source| RotationError::Deletion { name: artifact.name.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveFile;
    use anyhow::Result;
    use std::path::Path;

    struct StubDrive {
        files: Vec<DriveFile>,
        fail_list: bool,
        fail_delete: bool,
    }

    #[async_trait]
    impl DriveFiles for StubDrive {
        async fn list_children(&self, _folder_id: &str) -> Result<Vec<DriveFile>> {
            if self.fail_list {
                anyhow::bail!("API unreachable");
            }
            Ok(self.files.clone())
        }

        async fn delete_file(&self, file_id: &str) -> Result<()> {
            if self.fail_delete {
                anyhow::bail!("delete failed for {file_id}");
            }
            Ok(())
        }

        async fn upload(&self, _folder_id: &str, _name: &str, _path: &Path) -> Result<String> {
            anyhow::bail!("not used in these tests");
        }
    }

    fn file(id: &str, name: &str, created_time: &str) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            created_time: created_time.to_string(),
        }
    }

    #[tokio::test]
    async fn list_takes_the_date_component_of_created_time() -> Result<()> {
        let stub = StubDrive {
            files: vec![file("a", "site_2024-03-10.zip", "2024-03-10T23:59:59.123456Z")],
            fail_list: false,
            fail_delete: false,
        };
        let catalog = DriveCatalog::new(Arc::new(stub), "folder-1");

        let listing = catalog.list().await?;
        assert_eq!(listing.artifacts.len(), 1);
        assert_eq!(
            listing.artifacts[0].created,
            NaiveDate::parse_from_str("2024-03-10", "%Y-%m-%d")?
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_skips_objects_with_unparseable_timestamps() -> Result<()> {
        let stub = StubDrive {
            files: vec![
                file("a", "good.zip", "2024-03-10T02:00:00.000000Z"),
                file("b", "bad.zip", "yesterday-ish"),
            ],
            fail_list: false,
            fail_delete: false,
        };
        let catalog = DriveCatalog::new(Arc::new(stub), "folder-1");

        let listing = catalog.list().await?;
        assert_eq!(listing.artifacts.len(), 1);
        assert_eq!(listing.skipped, vec!["bad.zip"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_failure_is_an_enumeration_error() {
        let stub = StubDrive { files: vec![], fail_list: true, fail_delete: false };
        let catalog = DriveCatalog::new(Arc::new(stub), "folder-1");

        let result = catalog.list().await;
        assert!(matches!(result, Err(RotationError::Enumeration { catalog: "drive", .. })));
    }

    #[tokio::test]
    async fn delete_failure_is_a_deletion_error() -> Result<()> {
        let stub = StubDrive {
            files: vec![file("a", "site_2024-01-02.zip", "2024-01-02T02:00:00.000000Z")],
            fail_list: false,
            fail_delete: true,
        };
        let catalog = DriveCatalog::new(Arc::new(stub), "folder-1");

        let listing = catalog.list().await?;
        let result = catalog.delete(&listing.artifacts[0]).await;
        assert!(matches!(result, Err(RotationError::Deletion { .. })));
        Ok(())
    }
}
