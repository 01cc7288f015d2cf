//! Portfolio performance domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept for derived ratios.
pub const RATIO_DECIMAL_PLACES: u32 = 2;

/// Aggregate of one portfolio on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedPortfolioPerformance {
    pub date: NaiveDate,
    /// Cost basis plus fees of every transaction held on `date`
    pub invested: Decimal,
    /// Shares times that day's price for every transaction held on `date`
    pub value: Decimal,
}

impl DatedPortfolioPerformance {
    pub fn new(date: NaiveDate, invested: Decimal, value: Decimal) -> Self {
        Self {
            date,
            invested,
            value,
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, Decimal::ZERO, Decimal::ZERO)
    }

    pub fn gain(&self) -> Decimal {
        self.value - self.invested
    }

    /// Gain relative to invested capital, in percent, banker's-rounded to
    /// two places. `None` while nothing is invested.
    pub fn return_pct(&self) -> Option<Decimal> {
        if self.invested.is_zero() {
            return None;
        }
        let ratio = self.gain() * Decimal::ONE_HUNDRED / self.invested;
        Some(ratio.round_dp_with_strategy(RATIO_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven))
    }
}

/// Full daily series of one portfolio, from its first transaction to the
/// day it was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPortfolioPerformance {
    pub id: String,
    pub portfolio_id: String,
    pub performances: Vec<DatedPortfolioPerformance>,
    pub calculated_at: DateTime<Utc>,
}

impl HistoricalPortfolioPerformance {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.performances.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.performances.last().map(|p| p.date)
    }

    pub fn latest(&self) -> Option<&DatedPortfolioPerformance> {
        self.performances.last()
    }

    pub fn on(&self, date: NaiveDate) -> Option<&DatedPortfolioPerformance> {
        self.performances
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.performances[idx])
    }
}
