//! HTTP read API over the persisted rates.
//!
//! A thin pass-through query layer: every response is derived from the
//! store on demand, spreads included, so nothing served here can drift from
//! the persisted columns.

use crate::core::{Currency, CurrencyQuote, StoreError};
use crate::store::RateStore;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

const DEFAULT_LATEST_LIMIT: usize = 7;

/// Create the API router with all endpoints
pub fn create_router(store: Arc<dyn RateStore>) -> Router {
    Router::new()
        .route("/api/rates/:currency", get(get_all_rates))
        .route("/api/rates/:currency/latest", get(get_latest_rates))
        .route("/api/rates/:currency/:date", get(get_rate_on))
        .with_state(store)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Binds the listen address and serves the router until shutdown.
pub async fn serve(listen: &str, store: Arc<dyn RateStore>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind API listener on {listen}"))?;
    info!("Read API listening on {listen}");
    axum::serve(listener, create_router(store)).await?;
    Ok(())
}

type ApiError = (StatusCode, String);

fn parse_currency(raw: &str) -> Result<Currency, ApiError> {
    raw.parse()
        .map_err(|_| (StatusCode::NOT_FOUND, format!("unknown currency '{raw}'")))
}

fn store_failure(err: StoreError) -> ApiError {
    (StatusCode::BAD_GATEWAY, err.to_string())
}

/// GET /api/rates/:currency - every recorded quote for one currency
async fn get_all_rates(
    Path(currency): Path<String>,
    State(store): State<Arc<dyn RateStore>>,
) -> Result<Json<Vec<CurrencyQuote>>, ApiError> {
    let currency = parse_currency(&currency)?;
    let rows = store.all_rates().await.map_err(store_failure)?;
    if rows.is_empty() {
        return Err((StatusCode::NOT_FOUND, "no rates recorded".to_string()));
    }
    Ok(Json(
        rows.iter()
            .map(|row| CurrencyQuote::from_row(row, currency))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct LatestQuery {
    limit: Option<usize>,
}

/// GET /api/rates/:currency/latest?limit=N - most recent N days
async fn get_latest_rates(
    Path(currency): Path<String>,
    Query(query): Query<LatestQuery>,
    State(store): State<Arc<dyn RateStore>>,
) -> Result<Json<Vec<CurrencyQuote>>, ApiError> {
    let currency = parse_currency(&currency)?;
    let limit = query.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    let rows = store.latest_rates(limit).await.map_err(store_failure)?;
    if rows.is_empty() {
        return Err((StatusCode::NOT_FOUND, "no rates recorded".to_string()));
    }
    Ok(Json(
        rows.iter()
            .map(|row| CurrencyQuote::from_row(row, currency))
            .collect(),
    ))
}

/// GET /api/rates/:currency/:date - the quote for an exact date
async fn get_rate_on(
    Path((currency, date)): Path<(String, String)>,
    State(store): State<Arc<dyn RateStore>>,
) -> Result<Json<CurrencyQuote>, ApiError> {
    let currency = parse_currency(&currency)?;
    let date: NaiveDate = date
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid date '{date}'")))?;
    match store.rate_on(date).await.map_err(store_failure)? {
        Some(row) => Ok(Json(CurrencyQuote::from_row(&row, currency))),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("no rates recorded for {date}"),
        )),
    }
}
