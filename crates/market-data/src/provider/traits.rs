//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{DailyPrice, SpotPrice};

/// Live source of market prices.
///
/// Implementations talk to an external service and are treated as
/// unreliable: every failure is returned to the caller, never masked.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockfolio_market_data::{DailyPrice, MarketDataError, PriceProvider, SpotPrice};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl PriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn spot_price(&self, ticker: &str) -> Result<SpotPrice, MarketDataError> {
///         // ...
///     }
///
///     async fn historical_daily_series(
///         &self,
///         ticker: &str,
///     ) -> Result<Vec<DailyPrice>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ALPHA_VANTAGE".
    fn id(&self) -> &'static str;

    /// Requests per minute the provider tolerates.
    ///
    /// Used as the default limit when the configuration does not set one.
    fn requests_per_minute(&self) -> u32 {
        60
    }

    /// Fetch the current market price for a ticker.
    async fn spot_price(&self, ticker: &str) -> Result<SpotPrice, MarketDataError>;

    /// Fetch the full known daily closing series for a ticker.
    ///
    /// The series is ordered by date ascending with one entry per trading day.
    async fn historical_daily_series(
        &self,
        ticker: &str,
    ) -> Result<Vec<DailyPrice>, MarketDataError>;
}
