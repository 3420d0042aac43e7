use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while loading, replacing or reading the university catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened or read.
    #[error("catalog source {path} is unreadable: {source}")]
    SourceUnreadable {
        /// Catalog file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The catalog file is not a JSON array of university records.
    #[error("catalog source {path} is malformed: {reason}")]
    SourceMalformed {
        /// Catalog file location.
        path: PathBuf,
        /// Parser or validation message.
        reason: String,
    },
    /// Writing the replacement catalog failed; the previous file is left in place.
    #[error("could not write catalog {path}: {source}")]
    SourceWrite {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A record lacks a field an answer needs.
    #[error("university `{university}` has no `{field}`")]
    RecordFieldMissing {
        /// Display name of the record.
        university: String,
        /// Source key of the missing field.
        field: &'static str,
    },
    /// An admin upload was rejected before touching the catalog file.
    #[error("invalid catalog upload: {0}")]
    InvalidUpload(String),
}

impl CatalogError {
    /// Short machine-readable kind used in log records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnreadable { .. } => "source_unreadable",
            Self::SourceMalformed { .. } => "source_malformed",
            Self::SourceWrite { .. } => "source_write",
            Self::RecordFieldMissing { .. } => "record_field_missing",
            Self::InvalidUpload(_) => "invalid_upload",
        }
    }
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
