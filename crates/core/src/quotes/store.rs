//! Quote cache storage trait.
//!
//! Abstracts the persisted cache of spot quotes and daily series, allowing
//! different storage backends to be used interchangeably.

use async_trait::async_trait;

use super::model::{HistoricalQuote, Quote};
use crate::errors::Result;

/// Persisted cache of the latest quote and the daily series per ticker.
///
/// # Design Notes
///
/// - Async methods are used for writes, sync methods for lookups
/// - Writes are "latest wins" upserts keyed by ticker, so two writers racing
///   on the same ticker leave one complete record behind
/// - Clearing a ticker that has nothing cached is not an error
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Gets the cached spot quote for a ticker.
    fn get_quote(&self, ticker: &str) -> Result<Option<Quote>>;

    /// Inserts the quote, or overwrites price and timestamp of the existing one.
    async fn put_quote(&self, quote: &Quote) -> Result<()>;

    /// Removes the cached spot quote for a ticker.
    async fn clear_quote(&self, ticker: &str) -> Result<()>;

    /// Gets the cached daily series for a ticker.
    fn get_historical_quote(&self, ticker: &str) -> Result<Option<HistoricalQuote>>;

    /// Inserts the series, replacing any existing one for the same ticker.
    async fn put_historical_quote(&self, historical_quote: &HistoricalQuote) -> Result<()>;

    /// Removes the cached daily series for a ticker.
    async fn clear_historical_quote(&self, ticker: &str) -> Result<()>;
}
