//! Price services.
//!
//! [`PriceServiceTrait`] is the one capability the performance pipeline
//! prices through. Two implementations exist:
//! - [`LivePriceService`] - calls the external provider behind the shared
//!   rate limiter
//! - [`CachedPriceService`] - reuses [`QuoteStore`] data, falling through to
//!   a live service on a miss or an expired quote

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use stockfolio_market_data::{PriceProvider, RateLimiter};

use super::model::{HistoricalQuote, Quote};
use super::store::QuoteStore;
use crate::errors::{Error, Result};
use crate::utils::time_utils::Clock;

/// Price lookups used by the performance pipeline.
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    /// Current spot price for a ticker.
    async fn price(&self, ticker: &str) -> Result<Decimal>;

    /// Full daily closing series for a ticker.
    async fn historical_price(&self, ticker: &str) -> Result<HistoricalQuote>;

    /// Price of a ticker on a calendar day.
    ///
    /// Uses the latest close at or before `date`. A day after the end of
    /// the series that is not in the past gets the spot price. Returns
    /// `None` when the series has nothing at or before `date`.
    async fn price_on(&self, ticker: &str, date: NaiveDate) -> Result<Option<Decimal>>;
}

/// Rejects prices that are zero or negative.
pub(crate) fn ensure_positive(ticker: &str, price: Decimal) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(Error::invalid_price(ticker, price));
    }
    Ok(price)
}

async fn lookup_price_on<S>(
    service: &S,
    ticker: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Option<Decimal>>
where
    S: PriceServiceTrait + ?Sized,
{
    let series = service.historical_price(ticker).await?;
    let beyond_series = series.last_date().map_or(true, |last| date > last);

    if beyond_series && date >= today {
        return service.price(ticker).await.map(Some);
    }

    series
        .price_on_or_before(date)
        .map(|price| ensure_positive(ticker, price))
        .transpose()
}

// =============================================================================
// Live
// =============================================================================

/// Price service backed directly by the external provider.
///
/// Every fetch first waits on the shared rate limiter.
pub struct LivePriceService {
    provider: Arc<dyn PriceProvider>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
}

impl LivePriceService {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            clock,
        }
    }
}

#[async_trait]
impl PriceServiceTrait for LivePriceService {
    async fn price(&self, ticker: &str) -> Result<Decimal> {
        self.rate_limiter.wait_if_needed().await;
        let spot = self.provider.spot_price(ticker).await?;
        debug!(
            "Fetched spot price {} for {} from {}",
            spot.price,
            ticker,
            self.provider.id()
        );
        ensure_positive(ticker, spot.price)
    }

    async fn historical_price(&self, ticker: &str) -> Result<HistoricalQuote> {
        self.rate_limiter.wait_if_needed().await;
        let prices = self.provider.historical_daily_series(ticker).await?;
        if let Some(bad) = prices.iter().find(|p| p.price <= Decimal::ZERO) {
            return Err(Error::invalid_price(ticker, bad.price));
        }
        debug!(
            "Fetched {} daily prices for {} from {}",
            prices.len(),
            ticker,
            self.provider.id()
        );
        Ok(HistoricalQuote::new(ticker, prices, self.clock.now()))
    }

    async fn price_on(&self, ticker: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        lookup_price_on(self, ticker, date, self.clock.today()).await
    }
}

// =============================================================================
// Cached
// =============================================================================

/// Price service that reuses cached quotes.
///
/// Spot quotes are reused while younger than the TTL. Daily series are
/// reused as long as they are cached; only [`CachedPriceService::invalidate`]
/// drops them. A failed live fetch is returned as-is, even if an expired
/// quote is still cached.
pub struct CachedPriceService {
    quote_store: Arc<dyn QuoteStore>,
    live: Arc<dyn PriceServiceTrait>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CachedPriceService {
    pub fn new(
        quote_store: Arc<dyn QuoteStore>,
        live: Arc<dyn PriceServiceTrait>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            quote_store,
            live,
            clock,
            ttl,
        }
    }

    /// Drops the cached quote and daily series for a ticker.
    pub async fn invalidate(&self, ticker: &str) -> Result<()> {
        self.quote_store.clear_quote(ticker).await?;
        self.quote_store.clear_historical_quote(ticker).await?;
        debug!("Invalidated cached prices for {}", ticker);
        Ok(())
    }

    /// Invalidates a ticker, then fetches and caches a fresh daily series and
    /// spot price. Returns the new spot price.
    pub async fn refresh(&self, ticker: &str) -> Result<Decimal> {
        self.invalidate(ticker).await?;
        let series = self.historical_price(ticker).await?;
        let spot = self.price(ticker).await?;
        info!(
            "Refreshed {}: {} daily prices, spot {}",
            ticker,
            series.len(),
            spot
        );
        Ok(spot)
    }
}

#[async_trait]
impl PriceServiceTrait for CachedPriceService {
    async fn price(&self, ticker: &str) -> Result<Decimal> {
        let now = self.clock.now();

        if let Some(cached) = self.quote_store.get_quote(ticker)? {
            if cached.is_fresh(now, self.ttl) {
                return ensure_positive(ticker, cached.price);
            }
            debug!(
                "Cached quote for {} is {}h old, fetching a new one",
                ticker,
                cached.age(now).num_hours()
            );
        }

        let price = self.live.price(ticker).await?;
        self.quote_store
            .put_quote(&Quote::new(ticker, price, now))
            .await?;
        Ok(price)
    }

    async fn historical_price(&self, ticker: &str) -> Result<HistoricalQuote> {
        if let Some(cached) = self.quote_store.get_historical_quote(ticker)? {
            return Ok(cached);
        }

        let series = self.live.historical_price(ticker).await?;
        self.quote_store.put_historical_quote(&series).await?;
        Ok(series)
    }

    async fn price_on(&self, ticker: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        lookup_price_on(self, ticker, date, self.clock.today()).await
    }
}
