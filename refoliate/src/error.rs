//! Common error types for refoliate

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for refoliate operations
pub type Result<T> = std::result::Result<T, RestoreError>;

/// Errors that abort a restore run
///
/// Everything here is fatal: the loader and hierarchy builder fail before
/// any remote contact is made, and a FOLIO server-side failure stops the
/// replay regardless of the stop-on-error setting. Per-record rejections
/// (4xx validation failures) are not errors; they are reported through
/// `folio::CreateOutcome::Rejected` and counted in the run summary.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// File or directory could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON document has no usable "id" field
    #[error("Record in {path} has no \"id\" field")]
    MissingId { path: PathBuf },

    /// Two files claim the same record identifier
    #[error("Duplicate record id {id} found in {path}")]
    DuplicateId { id: String, path: PathBuf },

    /// Loaded records that could not be placed in the hierarchy
    #[error("{} record(s) could not be placed in the hierarchy: {}", missing.len(), missing.join(", "))]
    IncompleteHierarchy { missing: Vec<String> },

    /// FOLIO server-side (5xx) or transport failure
    #[error("FOLIO server error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RemoteServer { status: Option<u16>, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant breached; indicates a bug, not bad input
    #[error("Internal error: {0}")]
    Internal(String),
}
