pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod source;
pub mod store;

use crate::core::{Currency, CurrencyQuote};
use crate::source::HttpWorkbookSource;
use crate::store::{RateStore, SupabaseStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// One extract-normalize-upsert run.
    Ingest,
    /// Serve the read API over the persisted rates.
    Serve,
    /// Print the most recent quotes for one currency.
    Latest { currency: Currency, limit: usize },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Peso tracker starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };

    match command {
        AppCommand::Ingest => {
            let source = HttpWorkbookSource::new(&config.source)?;
            let store = SupabaseStore::new(&config.store)?;
            let report = pipeline::run(&source, &store).await?;
            println!("{}", cli::report::render_ingest_report(&report));
            Ok(())
        }
        AppCommand::Serve => {
            let store: Arc<dyn RateStore> = Arc::new(SupabaseStore::new(&config.store)?);
            api::serve(&config.api.listen, store).await
        }
        AppCommand::Latest { currency, limit } => {
            let store = SupabaseStore::new(&config.store)?;
            let rows = store.latest_rates(limit).await?;
            let quotes: Vec<CurrencyQuote> = rows
                .iter()
                .map(|row| CurrencyQuote::from_row(row, currency))
                .collect();
            println!("{}", cli::report::render_latest(currency, &quotes));
            Ok(())
        }
    }
}
