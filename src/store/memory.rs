//! In-memory store used by tests and offline runs.

use super::{RateStore, WriteReport};
use crate::core::{RateRow, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Keeps one row per date in memory, with the same full-row overwrite
/// semantics as the remote table.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<BTreeMap<NaiveDate, RateRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn upsert(&self, rows: &[RateRow]) -> Result<WriteReport, StoreError> {
        if rows.is_empty() {
            return Ok(WriteReport { affected: 0 });
        }

        let mut table = self.rows.write().await;
        for row in rows {
            table.insert(row.date, row.clone());
        }
        Ok(WriteReport {
            affected: rows.len(),
        })
    }

    async fn all_rates(&self) -> Result<Vec<RateRow>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn latest_rates(&self, limit: usize) -> Result<Vec<RateRow>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn rate_on(&self, date: NaiveDate) -> Result<Option<RateRow>, StoreError> {
        Ok(self.rows.read().await.get(&date).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_row(date: NaiveDate, buy: f64, sell: Option<f64>) -> RateRow {
        RateRow::from_values(
            date,
            [
                Some(buy),
                sell,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
            ],
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let batch = vec![
            usd_row(date(2024, 3, 1), 39.5, Some(41.2)),
            usd_row(date(2024, 3, 2), 39.7, Some(41.4)),
        ];

        let first = store.upsert(&batch).await.unwrap();
        let second = store.upsert(&batch).await.unwrap();
        assert_eq!(first.affected, 2);
        assert_eq!(second.affected, 2);

        // Two upserts of the same batch leave the same final state.
        assert_eq!(store.len().await, 2);
        let all = store.all_rates().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, date(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_conflicting_date_overwrites_full_row() {
        let store = MemoryStore::new();
        store
            .upsert(&[usd_row(date(2024, 3, 1), 39.5, Some(41.2))])
            .await
            .unwrap();
        // The new row has no sell side; the old value must not survive.
        store
            .upsert(&[usd_row(date(2024, 3, 1), 40.0, None)])
            .await
            .unwrap();

        let row = store.rate_on(date(2024, 3, 1)).await.unwrap().unwrap();
        assert_eq!(row.usd_buy, Some(40.0));
        assert_eq!(row.usd_sell, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_latest_rates_orders_by_date_descending() {
        let store = MemoryStore::new();
        store
            .upsert(&[
                usd_row(date(2024, 3, 1), 39.5, None),
                usd_row(date(2024, 3, 3), 39.9, None),
                usd_row(date(2024, 3, 2), 39.7, None),
            ])
            .await
            .unwrap();

        let latest = store.latest_rates(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].date, date(2024, 3, 3));
        assert_eq!(latest[1].date, date(2024, 3, 2));
    }

    #[tokio::test]
    async fn test_rate_on_missing_date_is_none() {
        let store = MemoryStore::new();
        assert!(store.rate_on(date(2024, 3, 1)).await.unwrap().is_none());
    }
}
