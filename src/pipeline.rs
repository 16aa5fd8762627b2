//! Sequences one ingestion run: fetch, normalize, build, write.
//!
//! Each stage consumes the prior stage's complete output; there is no
//! parallelism and no internal retry. Retry policy belongs to whatever
//! schedules the run.

use crate::core::{PipelineError, RowError, Stage};
use crate::normalize;
use crate::records;
use crate::source::WorkbookSource;
use crate::store::RateStore;
use tracing::{error, info, warn};

/// Outcome of one complete run. A run with some row errors but at least one
/// written row is a partial success, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Data rows present in the source table.
    pub rows_seen: usize,
    /// Rows inserted or overwritten by the upsert.
    pub written: usize,
    /// Rows or fields excluded during record building.
    pub row_errors: Vec<RowError>,
}

/// Runs the pipeline once against the given source and store. Stage
/// failures abort and carry the failed stage; row-level failures accumulate
/// in the report.
pub async fn run(
    source: &dyn WorkbookSource,
    store: &dyn RateStore,
) -> Result<IngestReport, PipelineError> {
    info!(stage = %Stage::Fetching, "Downloading quotation workbook");
    let bytes = source.fetch().await.inspect_err(|e| {
        error!("Workbook download failed: {e}");
    })?;
    info!("Downloaded {} bytes", bytes.len());

    info!(stage = %Stage::Normalizing, "Normalizing workbook");
    let table = normalize::normalize(&bytes).inspect_err(|e| {
        error!("Workbook normalization failed: {e}");
    })?;
    let rows_seen = table.rows.len();

    info!(stage = %Stage::Building, "Building records from {rows_seen} rows");
    let (rate_rows, row_errors) = records::build_records(&table);
    for row_error in &row_errors {
        warn!("Skipping bad cell or row: {row_error}");
    }

    info!(stage = %Stage::Writing, "Upserting {} records", rate_rows.len());
    let report = store.upsert(&rate_rows).await.inspect_err(|e| {
        error!(attempted = rate_rows.len(), "Upsert failed: {e}");
    })?;

    info!(
        written = report.affected,
        skipped = row_errors.len(),
        "Ingestion run complete"
    );

    Ok(IngestReport {
        rows_seen,
        written: report.affected,
        row_errors,
    })
}
