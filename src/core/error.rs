//! Error taxonomy for the ingestion pipeline.
//!
//! Stage-level errors abort a run and surface to the orchestrator's caller
//! with the failed stage; `RowError` is accumulated per row and never aborts
//! the batch. Nothing here is retried internally.

use std::fmt;
use thiserror::Error;

/// Pre-flight failure: a required configuration value is absent or
/// malformed. Raised before any network I/O is attempted.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Failures while downloading the quotation workbook.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure or timeout. Safe to retry on a later run.
    #[error("network failure while downloading workbook: {0}")]
    Transient(#[from] reqwest::Error),

    /// The source answered with a non-2xx status. Inspect before retrying.
    #[error("source responded with HTTP {status}")]
    Remote { status: u16 },
}

/// Failures while reshaping the raw workbook into the canonical table.
/// Malformed source structure is not locally recoverable.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("could not read workbook: {0}")]
    Parse(String),

    #[error("workbook is missing required column '{0}'")]
    Schema(&'static str),
}

/// Failures while talking to the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection-level failure; the store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request (constraint or payload problem).
    #[error("store rejected request: {0}")]
    Rejected(String),
}

/// A per-row validation failure. Excludes only the affected record (or
/// field) from the batch without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Zero-based data row index in the source table.
    pub row: usize,
    /// Offending column, when the failure is scoped to a single field.
    pub field: Option<&'static str>,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "row {}, {}: {}", self.row, field, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

/// Union of the fatal pipeline errors, tagged with the stage they abort.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("write failed: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// The pipeline stage this error aborted.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) => Stage::Fetching,
            PipelineError::Normalize(_) => Stage::Normalizing,
            PipelineError::Store(_) => Stage::Writing,
        }
    }
}

/// The sequential stages of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Normalizing,
    Building,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Fetching => "fetching",
                Stage::Normalizing => "normalizing",
                Stage::Building => "building",
                Stage::Writing => "writing",
            }
        )
    }
}
