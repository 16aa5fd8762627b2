//! Supabase-backed store, speaking PostgREST over HTTP.

use super::{RateStore, WriteReport};
use crate::config::{StoreConfig, validate_http_url};
use crate::core::{ConfigError, RateRow, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Talks to one PostgREST table. The upsert is a single batched request with
/// `date` as the conflict target, so concurrent readers never observe a
/// partially written batch.
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    table: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    /// Validates the configured project URL, key and table identifier. No
    /// network I/O happens here.
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let base_url = validate_http_url(&config.base_url, "store.base_url")?;
        if config.api_key.trim().is_empty() {
            return Err(ConfigError("store.api_key must not be empty".to_string()));
        }
        let table = config.table.trim();
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError(format!(
                "store.table is not a valid identifier: '{}'",
                config.table
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent("peso-tracker/0.4")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(SupabaseStore {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: table.to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select(&self, query: &[(&str, &str)]) -> Result<Vec<RateRow>, StoreError> {
        let response = self
            .authorize(self.client.get(self.endpoint()))
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Rejected(format!("unreadable response body: {e}")))
    }
}

#[async_trait]
impl RateStore for SupabaseStore {
    async fn upsert(&self, rows: &[RateRow]) -> Result<WriteReport, StoreError> {
        if rows.is_empty() {
            debug!("No records to write, skipping upsert");
            return Ok(WriteReport { affected: 0 });
        }

        debug!("Upserting {} records into '{}'", rows.len(), self.table);
        let response = self
            .authorize(self.client.post(self.endpoint()))
            .query(&[("on_conflict", "date")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(rows)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let written: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Rejected(format!("unreadable upsert response: {e}")))?;
        Ok(WriteReport {
            affected: written.len(),
        })
    }

    async fn all_rates(&self) -> Result<Vec<RateRow>, StoreError> {
        self.select(&[("select", "*"), ("order", "date.asc")]).await
    }

    async fn latest_rates(&self, limit: usize) -> Result<Vec<RateRow>, StoreError> {
        let limit = limit.to_string();
        self.select(&[
            ("select", "*"),
            ("order", "date.desc"),
            ("limit", limit.as_str()),
        ])
        .await
    }

    async fn rate_on(&self, date: NaiveDate) -> Result<Option<RateRow>, StoreError> {
        let filter = format!("eq.{date}");
        let rows = self
            .select(&[("select", "*"), ("date", filter.as_str())])
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Connection-level problems (5xx) and rejections (4xx) are distinguished so
/// callers know whether a later retry can make sense.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        Err(StoreError::Unavailable(format!("HTTP {status}: {body}")))
    } else {
        Err(StoreError::Rejected(format!("HTTP {status}: {body}")))
    }
}
