use std::fmt;

/// Errors from a backup rotation run.
///
/// The variant determines containment:
/// - `Configuration` → fatal, aborts before any catalog work
/// - `Enumeration` → aborts that catalog's pass; the other catalog proceeds
/// - `Parse` → the artifact is skipped and enumeration continues
/// - `Deletion` → recorded per artifact in the report; the batch continues
#[derive(Debug)]
pub enum RotationError {
    /// Required identifiers or parameters absent or invalid.
    Configuration(String),
    /// Whole-backend listing failure (directory unreadable, API unreachable).
    Enumeration {
        catalog: &'static str,
        source: anyhow::Error,
    },
    /// A single artifact's creation date could not be derived.
    Parse { name: String, reason: String },
    /// A single artifact's removal failed.
    Deletion {
        name: String,
        source: anyhow::Error,
    },
}

impl RotationError {
    /// Whether this error fails the whole run, as opposed to being
    /// contained in the rotation report or the skip channel.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Enumeration { .. })
    }
}

impl fmt::Display for RotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Enumeration { catalog, source } => {
                write!(f, "{catalog} catalog enumeration failed: {source}")
            }
            Self::Parse { name, reason } => {
                write!(f, "cannot derive a date for {name:?}: {reason}")
            }
            Self::Deletion { name, source } => {
                write!(f, "failed to delete {name:?}: {source}")
            }
        }
    }
}

impl std::error::Error for RotationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Enumeration { source, .. } | Self::Deletion { source, .. } => {
                Some(source.as_ref())
            }
            Self::Configuration(_) | Self::Parse { .. } => None,
        }
    }
}
