use chrono::NaiveDate;
use tracing::{info, warn};

use crate::catalog::BackupCatalog;
use crate::error::RotationError;
use crate::retention;

/// Outcome of one catalog's rotation pass.
#[derive(Debug, Default)]
pub struct RotationReport {
    /// Label of the catalog the pass ran against.
    pub catalog: &'static str,
    /// Ids of the artifacts that were deleted.
    pub deleted: Vec<String>,
    /// Count of artifacts the policy protected.
    pub retained: usize,
    /// Names of entries whose date could not be derived; excluded from
    /// both the keep and delete sets.
    pub skipped: Vec<String>,
    /// Artifacts whose deletion failed; the batch continued past each.
    pub failed: Vec<DeletionFailure>,
}

/// One artifact whose deletion failed.
#[derive(Debug)]
pub struct DeletionFailure {
    pub id: String,
    pub name: String,
    pub error: String,
}

impl RotationReport {
    /// True when every disqualified artifact was actually deleted.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies the retention policy to one catalog at a time.
///
/// Immutable for the whole run: every decision is a pure function of the
/// artifact's creation date, `today`, and `retention`. Recomputed from
/// scratch each run, so re-applying with unchanged inputs deletes nothing
/// further.
#[derive(Debug, Clone, Copy)]
pub struct RotationCoordinator {
    today: NaiveDate,
    retention: u32,
}

impl RotationCoordinator {
    pub const fn new(today: NaiveDate, retention: u32) -> Self {
        Self { today, retention }
    }

    /// Enumerate the catalog and delete every artifact the policy
    /// disqualifies, in enumeration order. A failed deletion is recorded
    /// in the report and never aborts the remaining batch; a listing
    /// failure aborts this catalog's pass only.
    pub async fn apply(&self, catalog: &dyn BackupCatalog) -> Result<RotationReport, RotationError> {
        let listing = catalog.list().await?;
        let mut report = RotationReport {
            catalog: catalog.label(),
            skipped: listing.skipped,
            ..RotationReport::default()
        };

        for artifact in listing.artifacts {
            if !retention::should_delete(artifact.created, self.today, self.retention) {
                report.retained += 1;
                continue;
            }
            match catalog.delete(&artifact).await {
                Ok(()) => {
                    info!(
                        catalog = catalog.label(),
                        name = %artifact.name,
                        created = %artifact.created,
                        "deleted old backup"
                    );
                    report.deleted.push(artifact.id);
                }
                Err(err) => {
                    warn!(
                        catalog = catalog.label(),
                        name = %artifact.name,
                        error = %err,
                        "failed to delete old backup (continuing)"
                    );
                    report.failed.push(DeletionFailure {
                        id: artifact.id,
                        name: artifact.name,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}
