use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::catalog::{BackupCatalog, DriveCatalog, LocalCatalog};
use crate::config::BackupConfig;
use crate::drive::{DriveClient, DriveFiles};
use crate::error::RotationError;
use crate::notify::{WebhookNotifier, WebhookPayload};
use crate::rotation::{RotationCoordinator, RotationReport};

/// One backup run: upload today's archive if present, rotate the local
/// and remote catalogs independently, send the webhook summary.
///
/// Deletion failures degrade the run to a warning; an enumeration failure
/// of either catalog fails the run — after the other catalog's pass has
/// completed and the webhook has been sent.
pub async fn run(config: BackupConfig) -> Result<()> {
    let http = reqwest::Client::new();
    let client: Arc<dyn DriveFiles> =
        Arc::new(DriveClient::new(http.clone(), config.access_token.clone()));

    let today = config.reference_date();
    let project = config.project_name()?;
    let archive_name = format!("{project}_{}.zip", today.format("%Y-%m-%d"));

    info!(project = %project, date = %today, retention = config.retention, "backup run started");

    let uploaded = upload_archive(client.as_ref(), &config, &archive_name).await;

    let local = LocalCatalog::new(config.backup_dir.clone());
    let remote = DriveCatalog::new(Arc::clone(&client), config.folder_id.clone());
    let catalogs: [&dyn BackupCatalog; 2] = [&local, &remote];

    let coordinator = RotationCoordinator::new(today, config.retention);
    let (reports, enumeration_failures) = rotate_all(&coordinator, &catalogs).await;

    let deletions_clean = reports.iter().all(RotationReport::is_clean);
    let success = uploaded && enumeration_failures.is_empty() && deletions_clean;

    if config.use_webhook {
        if let Some(url) = &config.webhook_url {
            let message = if success { "BackupSuccessful" } else { "BackupFailed" };
            WebhookNotifier::new(http, url.clone())
                .notify(&WebhookPayload {
                    project: config.project_path.display().to_string(),
                    date: today.format("%Y-%m-%d").to_string(),
                    message: message.to_string(),
                })
                .await;
        } else {
            warn!("USE_WEBHOOK is set but WEBHOOK_URL is empty");
        }
    }

    for (catalog, err) in &enumeration_failures {
        error!(catalog, error = %err, "rotation pass aborted");
    }
    if !enumeration_failures.is_empty() {
        anyhow::bail!(
            "{} rotation pass(es) failed to enumerate",
            enumeration_failures.len()
        );
    }
    if deletions_clean {
        info!("backup run completed");
    } else {
        warn!("backup run completed with deletion failures");
    }
    Ok(())
}

/// Upload today's archive if the external archiver left it in the backup
/// directory. Returns false when the archive is missing or the upload
/// failed; rotation proceeds either way.
async fn upload_archive(
    client: &dyn DriveFiles,
    config: &BackupConfig,
    archive_name: &str,
) -> bool {
    let path = config.backup_dir.join(archive_name);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        warn!(path = %path.display(), "no archive for today; skipping upload");
        return false;
    }
    match client.upload(&config.folder_id, archive_name, &path).await {
        Ok(file_id) => {
            info!(file_id = %file_id, "archive uploaded");
            true
        }
        Err(err) => {
            error!(error = %err, "archive upload failed");
            false
        }
    }
}

/// Rotate each catalog in turn. An enumeration failure in one catalog
/// never prevents the other's pass; it is returned alongside the reports
/// of the passes that ran.
pub async fn rotate_all(
    coordinator: &RotationCoordinator,
    catalogs: &[&dyn BackupCatalog],
) -> (Vec<RotationReport>, Vec<(&'static str, RotationError)>) {
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for catalog in catalogs {
        match coordinator.apply(*catalog).await {
            Ok(report) => {
                info!(
                    catalog = report.catalog,
                    deleted = report.deleted.len(),
                    retained = report.retained,
                    skipped = report.skipped.len(),
                    failed = report.failed.len(),
                    "rotation pass finished"
                );
                reports.push(report);
            }
            Err(err) => failures.push((catalog.label(), err)),
        }
    }
    (reports, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BackupArtifact, CatalogListing};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct UnreachableCatalog;

    #[async_trait]
    impl BackupCatalog for UnreachableCatalog {
        fn label(&self) -> &'static str {
            "unreachable"
        }

        async fn list(&self) -> Result<CatalogListing, RotationError> {
            Err(RotationError::Enumeration {
                catalog: "unreachable",
                source: anyhow::anyhow!("API unreachable"),
            })
        }

        async fn delete(&self, _artifact: &BackupArtifact) -> Result<(), RotationError> {
            Err(RotationError::Deletion {
                name: "unexpected".to_string(),
                source: anyhow::anyhow!("delete on unreachable catalog"),
            })
        }
    }

    struct RecordingCatalog {
        artifacts: Vec<BackupArtifact>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BackupCatalog for RecordingCatalog {
        fn label(&self) -> &'static str {
            "recording"
        }

        async fn list(&self) -> Result<CatalogListing, RotationError> {
            Ok(CatalogListing {
                artifacts: self.artifacts.clone(),
                skipped: Vec::new(),
            })
        }

        async fn delete(&self, artifact: &BackupArtifact) -> Result<(), RotationError> {
            if let Ok(mut deleted) = self.deleted.lock() {
                deleted.push(artifact.id.clone());
            }
            Ok(())
        }
    }

    #[allow(clippy::unwrap_used)]
    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn one_unreachable_backend_does_not_block_the_other() -> Result<()> {
        let healthy = RecordingCatalog {
            artifacts: vec![BackupArtifact {
                id: "old".to_string(),
                name: "site_2024-01-02.zip".to_string(),
                created: date("2024-01-02"),
            }],
            deleted: Mutex::new(Vec::new()),
        };
        let broken = UnreachableCatalog;
        let catalogs: [&dyn BackupCatalog; 2] = [&broken, &healthy];

        let coordinator = RotationCoordinator::new(date("2024-03-15"), 7);
        let (reports, failures) = rotate_all(&coordinator, &catalogs).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "unreachable");
        assert!(failures[0].1.is_fatal());

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].catalog, "recording");
        assert_eq!(reports[0].deleted, vec!["old"]);
        Ok(())
    }
}
