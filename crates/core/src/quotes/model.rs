//! Quote domain models.
//!
//! Two kinds of cached price data exist per ticker:
//! - [`Quote`] - latest spot price and when it was fetched (TTL checked)
//! - [`HistoricalQuote`] - full daily closing series (never re-validated)

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use stockfolio_market_data::DailyPrice;

// =============================================================================
// Quote
// =============================================================================

/// Latest known spot price for a ticker.
///
/// At most one exists per ticker; writing a new one replaces the old.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub ticker: String,
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(ticker: impl Into<String>, price: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            fetched_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// A quote is fresh while its age is strictly below `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

// =============================================================================
// Historical Quote
// =============================================================================

/// Full daily closing series for a ticker, ascending and unique per date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalQuote {
    pub ticker: String,
    prices: Vec<DailyPrice>,
    pub fetched_at: DateTime<Utc>,
}

impl HistoricalQuote {
    /// Builds a series, sorting by date. When a date repeats, the entry that
    /// comes last in `prices` wins.
    pub fn new(
        ticker: impl Into<String>,
        prices: Vec<DailyPrice>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let by_date: BTreeMap<NaiveDate, Decimal> =
            prices.into_iter().map(|p| (p.date, p.price)).collect();

        Self {
            ticker: ticker.into(),
            prices: by_date
                .into_iter()
                .map(|(date, price)| DailyPrice::new(date, price))
                .collect(),
            fetched_at,
        }
    }

    pub fn prices(&self) -> &[DailyPrice] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.prices.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.last().map(|p| p.date)
    }

    /// Closing price on exactly `date`.
    pub fn price_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.prices
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.prices[idx].price)
    }

    /// Closing price on the latest trading day at or before `date`.
    ///
    /// Weekends and holidays carry the previous close forward.
    pub fn price_on_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        let idx = self.prices.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.prices[i].price)
    }
}
