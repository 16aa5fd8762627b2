use super::WorkbookSource;
use crate::config::{SourceConfig, validate_http_url};
use crate::core::{ConfigError, FetchError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Downloads the quotation workbook over HTTP with a bounded timeout.
#[derive(Debug)]
pub struct HttpWorkbookSource {
    url: Url,
    client: reqwest::Client,
}

impl HttpWorkbookSource {
    /// Validates the configured URL and builds the client. No network I/O
    /// happens here; a malformed URL fails before any request is attempted.
    pub fn new(config: &SourceConfig) -> Result<Self, ConfigError> {
        let url = validate_http_url(&config.url, "source.url")?;
        let client = reqwest::Client::builder()
            .user_agent("peso-tracker/0.4")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpWorkbookSource { url, client })
    }
}

#[async_trait]
impl WorkbookSource for HttpWorkbookSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        debug!("Requesting workbook from {}", self.url);

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Remote {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body.to_vec())
    }
}
