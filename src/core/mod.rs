//! Core abstractions shared across the pipeline stages

pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use error::{
    ConfigError, FetchError, NormalizeError, PipelineError, RowError, Stage, StoreError,
};
pub use rates::{Currency, CurrencyQuote, NUMERIC_COLUMNS, RateRow};
