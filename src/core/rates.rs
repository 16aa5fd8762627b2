//! Canonical rate records shared by the pipeline, the store and the read API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Canonical numeric columns, in table order.
pub const NUMERIC_COLUMNS: [&str; 10] = [
    "usd_buy",
    "usd_sell",
    "ebrou_usd_buy",
    "ebrou_usd_sell",
    "eur_buy",
    "eur_sell",
    "ars_buy",
    "ars_sell",
    "brl_buy",
    "brl_sell",
];

/// One calendar date with up to five currency-pair quotations.
///
/// `date` is the natural key; every buy/sell pair is independently optional
/// and finite when present. Absent fields serialize as explicit nulls so an
/// upsert overwrites the full row instead of merging field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub usd_buy: Option<f64>,
    #[serde(default)]
    pub usd_sell: Option<f64>,
    #[serde(default)]
    pub ebrou_usd_buy: Option<f64>,
    #[serde(default)]
    pub ebrou_usd_sell: Option<f64>,
    #[serde(default)]
    pub eur_buy: Option<f64>,
    #[serde(default)]
    pub eur_sell: Option<f64>,
    #[serde(default)]
    pub ars_buy: Option<f64>,
    #[serde(default)]
    pub ars_sell: Option<f64>,
    #[serde(default)]
    pub brl_buy: Option<f64>,
    #[serde(default)]
    pub brl_sell: Option<f64>,
}

impl RateRow {
    /// Builds a row from values laid out in `NUMERIC_COLUMNS` order.
    pub fn from_values(date: NaiveDate, values: [Option<f64>; 10]) -> Self {
        let [
            usd_buy,
            usd_sell,
            ebrou_usd_buy,
            ebrou_usd_sell,
            eur_buy,
            eur_sell,
            ars_buy,
            ars_sell,
            brl_buy,
            brl_sell,
        ] = values;
        RateRow {
            date,
            usd_buy,
            usd_sell,
            ebrou_usd_buy,
            ebrou_usd_sell,
            eur_buy,
            eur_sell,
            ars_buy,
            ars_sell,
            brl_buy,
            brl_sell,
        }
    }

    /// Buy/sell pair for one currency.
    pub fn quote(&self, currency: Currency) -> (Option<f64>, Option<f64>) {
        match currency {
            Currency::Usd => (self.usd_buy, self.usd_sell),
            Currency::EbrouUsd => (self.ebrou_usd_buy, self.ebrou_usd_sell),
            Currency::Eur => (self.eur_buy, self.eur_sell),
            Currency::Ars => (self.ars_buy, self.ars_sell),
            Currency::Brl => (self.brl_buy, self.brl_sell),
        }
    }
}

/// The five quoted currency pairs against the Uruguayan peso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    /// USD quoted through the bank's online channel.
    EbrouUsd,
    Eur,
    Ars,
    Brl,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::EbrouUsd,
        Currency::Eur,
        Currency::Ars,
        Currency::Brl,
    ];
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Currency::Usd => "usd",
                Currency::EbrouUsd => "ebrou",
                Currency::Eur => "eur",
                Currency::Ars => "ars",
                Currency::Brl => "brl",
            }
        )
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "ebrou" | "ebrou_usd" => Ok(Currency::EbrouUsd),
            "eur" => Ok(Currency::Eur),
            "ars" => Ok(Currency::Ars),
            "brl" => Ok(Currency::Brl),
            _ => Err(anyhow::anyhow!("Unknown currency: {}", s)),
        }
    }
}

/// Single-currency view of a persisted row.
///
/// `spread` is derived at the read boundary and never stored, so it cannot
/// drift from its source columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyQuote {
    pub date: NaiveDate,
    pub buy: Option<f64>,
    pub sell: Option<f64>,
    pub spread: Option<f64>,
}

impl CurrencyQuote {
    pub fn from_row(row: &RateRow, currency: Currency) -> Self {
        let (buy, sell) = row.quote(currency);
        let spread = match (buy, sell) {
            (Some(buy), Some(sell)) => Some(sell - buy),
            _ => None,
        };
        CurrencyQuote {
            date: row.date,
            buy,
            sell,
            spread,
        }
    }
}
