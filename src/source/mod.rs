//! Retrieval of the raw quotation workbook.

pub mod http;

pub use http::HttpWorkbookSource;

use crate::core::FetchError;
use async_trait::async_trait;

/// A location the raw workbook bytes can be fetched from.
///
/// The pipeline takes the source as an explicit handle so tests can
/// substitute a stub without network access.
#[async_trait]
pub trait WorkbookSource: Send + Sync {
    /// Downloads the full workbook as an opaque byte sequence.
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}
