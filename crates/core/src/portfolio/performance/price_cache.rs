//! Per-recalculation price memo.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::quotes::HistoricalQuote;

/// Prices keyed by (ticker, calendar day).
///
/// Lives for a single portfolio recalculation and is never persisted.
#[derive(Debug, Default, Clone)]
pub struct TickerPriceCache {
    prices: HashMap<(String, NaiveDate), Decimal>,
}

impl TickerPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ticker: &str, date: NaiveDate) -> Option<Decimal> {
        self.prices.get(&(ticker.to_string(), date)).copied()
    }

    pub fn insert(&mut self, ticker: &str, date: NaiveDate, price: Decimal) {
        self.prices.insert((ticker.to_string(), date), price);
    }

    /// Copies every day of a cached daily series into the memo.
    pub fn extend_from_series(&mut self, series: &HistoricalQuote) {
        for daily in series.prices() {
            self.insert(&series.ticker, daily.date, daily.price);
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
