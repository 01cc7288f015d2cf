use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest traded price for a ticker as reported by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPrice {
    pub ticker: String,
    pub price: Decimal,
    /// Trading day the provider attributes the price to, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_day: Option<NaiveDate>,
    /// Source of the price (ALPHA_VANTAGE, ...)
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

/// Closing price of a ticker on one calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl DailyPrice {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}
