//! Persistence of validated rate records.

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use crate::core::{RateRow, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Outcome of one batched upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Rows inserted or overwritten by the batch.
    pub affected: usize,
}

/// A table of persisted rates keyed by calendar date.
///
/// Implementations are handed to the orchestrator explicitly, with their
/// lifecycle owned by the caller, so tests can substitute an in-memory store
/// without process-wide side effects.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Writes the batch as one conflict-resolving request keyed on `date`.
    /// Rows with an existing date are fully overwritten, not merged field by
    /// field. An empty batch is a no-op reported as zero affected.
    async fn upsert(&self, rows: &[RateRow]) -> Result<WriteReport, StoreError>;

    /// All persisted rows ordered by date ascending.
    async fn all_rates(&self) -> Result<Vec<RateRow>, StoreError>;

    /// The most recent `limit` rows ordered by date descending.
    async fn latest_rates(&self, limit: usize) -> Result<Vec<RateRow>, StoreError>;

    /// The row for an exact date, if any.
    async fn rate_on(&self, date: NaiveDate) -> Result<Option<RateRow>, StoreError>;
}
