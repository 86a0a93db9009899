mod drive;
mod local;

pub use drive::DriveCatalog;
pub use local::LocalCatalog;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::RotationError;

/// One backup artifact as reported by a catalog's enumeration.
///
/// The creation date is parsed once at listing time; downstream logic
/// never re-derives it from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    /// Backend-specific identity: the file path locally, the object id
    /// remotely. Only the catalog that produced the artifact may delete it.
    pub id: String,
    /// Display name used in logs and reports.
    pub name: String,
    /// Calendar date of creation, day granularity only.
    pub created: NaiveDate,
}

/// Result of one enumeration pass: typed artifacts plus the names of
/// entries whose creation date could not be derived.
#[derive(Debug, Default)]
pub struct CatalogListing {
    pub artifacts: Vec<BackupArtifact>,
    pub skipped: Vec<String>,
}

/// Abstraction over one storage backend's set of backup artifacts.
///
/// Backend-specific metadata parsing (filename pattern, timestamp field)
/// lives entirely inside each implementation; the retention policy only
/// ever sees typed artifacts.
#[async_trait]
pub trait BackupCatalog: Send + Sync {
    /// Short label for logs and reports.
    fn label(&self) -> &'static str;

    /// Enumerate artifacts. Individual malformed entries are dropped into
    /// `skipped` with a warning; `Err` means the whole backend is
    /// unavailable.
    async fn list(&self) -> Result<CatalogListing, RotationError>;

    /// Delete one artifact previously returned by `list`.
    async fn delete(&self, artifact: &BackupArtifact) -> Result<(), RotationError>;
}
