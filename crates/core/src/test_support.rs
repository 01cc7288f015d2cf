//! Hand-written mocks shared by the unit tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use stockfolio_market_data::{DailyPrice, MarketDataError, PriceProvider, SpotPrice};

use crate::errors::{DatabaseError, Error, Result};
use crate::portfolio::performance::{DatedPortfolioPerformance, HistoricalPortfolioPerformance};
use crate::portfolio::{Portfolio, PortfolioRepositoryTrait, Transaction, User, UserRepositoryTrait};
use crate::quotes::{HistoricalQuote, PriceServiceTrait, Quote, QuoteStore};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn transaction(
    id: &str,
    ticker: &str,
    purchase_date: NaiveDate,
    shares: Decimal,
    price_per_share: Decimal,
    fees: Decimal,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        ticker: ticker.to_string(),
        purchase_date,
        shares,
        price_per_share,
        fees,
        currency: "USD".to_string(),
        portfolio_id: "p1".to_string(),
        account_id: None,
    }
}

pub fn portfolio(id: &str, user_id: &str, transactions: Vec<Transaction>) -> Portfolio {
    Portfolio {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: format!("Portfolio {}", id),
        currency: "USD".to_string(),
        transactions,
        historical_performance_id: None,
    }
}

pub fn portfolio_with(transactions: Vec<Transaction>) -> Portfolio {
    portfolio("p1", "u1", transactions)
}

// =============================================================================
// Quote store
// =============================================================================

#[derive(Default)]
pub struct MockQuoteStore {
    quotes: Mutex<HashMap<String, Quote>>,
    historical: Mutex<HashMap<String, HistoricalQuote>>,
    put_quote_calls: Mutex<usize>,
    put_historical_calls: Mutex<usize>,
    fail_on_write: AtomicBool,
}

impl MockQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_quote(&self, quote: Quote) {
        self.quotes
            .lock()
            .unwrap()
            .insert(quote.ticker.clone(), quote);
    }

    pub fn insert_historical(&self, series: HistoricalQuote) {
        self.historical
            .lock()
            .unwrap()
            .insert(series.ticker.clone(), series);
    }

    pub fn quote(&self, ticker: &str) -> Option<Quote> {
        self.quotes.lock().unwrap().get(ticker).cloned()
    }

    pub fn historical(&self, ticker: &str) -> Option<HistoricalQuote> {
        self.historical.lock().unwrap().get(ticker).cloned()
    }

    pub fn put_quote_calls(&self) -> usize {
        *self.put_quote_calls.lock().unwrap()
    }

    pub fn put_historical_calls(&self) -> usize {
        *self.put_historical_calls.lock().unwrap()
    }

    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(DatabaseError::WriteFailed("Intentional write failure".into()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteStore for MockQuoteStore {
    fn get_quote(&self, ticker: &str) -> Result<Option<Quote>> {
        Ok(self.quote(ticker))
    }

    async fn put_quote(&self, quote: &Quote) -> Result<()> {
        self.check_write()?;
        *self.put_quote_calls.lock().unwrap() += 1;
        self.insert_quote(quote.clone());
        Ok(())
    }

    async fn clear_quote(&self, ticker: &str) -> Result<()> {
        self.quotes.lock().unwrap().remove(ticker);
        Ok(())
    }

    fn get_historical_quote(&self, ticker: &str) -> Result<Option<HistoricalQuote>> {
        Ok(self.historical(ticker))
    }

    async fn put_historical_quote(&self, historical_quote: &HistoricalQuote) -> Result<()> {
        self.check_write()?;
        *self.put_historical_calls.lock().unwrap() += 1;
        self.insert_historical(historical_quote.clone());
        Ok(())
    }

    async fn clear_historical_quote(&self, ticker: &str) -> Result<()> {
        self.historical.lock().unwrap().remove(ticker);
        Ok(())
    }
}

// =============================================================================
// Price provider
// =============================================================================

/// Provider answering from in-memory prices, recording every request.
#[derive(Default)]
pub struct MockPriceProvider {
    spot: Mutex<HashMap<String, Decimal>>,
    series: Mutex<HashMap<String, Vec<DailyPrice>>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_spot(&self, ticker: &str, price: Decimal) {
        self.spot.lock().unwrap().insert(ticker.to_string(), price);
    }

    pub fn set_series(&self, ticker: &str, prices: Vec<DailyPrice>) {
        self.series
            .lock()
            .unwrap()
            .insert(ticker.to_string(), prices);
    }

    pub fn fail_for(&self, ticker: &str) {
        self.failing.lock().unwrap().insert(ticker.to_string());
    }

    /// Requests in call order, as `spot:TICKER` / `daily:TICKER`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn check_failing(&self, ticker: &str) -> std::result::Result<(), MarketDataError> {
        if self.failing.lock().unwrap().contains(ticker) {
            return Err(MarketDataError::ProviderError {
                provider: "MOCK".to_string(),
                message: format!("Intentional failure for {}", ticker),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn spot_price(&self, ticker: &str) -> std::result::Result<SpotPrice, MarketDataError> {
        self.requests.lock().unwrap().push(format!("spot:{}", ticker));
        self.check_failing(ticker)?;
        let price = self
            .spot
            .lock()
            .unwrap()
            .get(ticker)
            .copied()
            .ok_or_else(|| MarketDataError::SymbolNotFound(ticker.to_string()))?;
        Ok(SpotPrice {
            ticker: ticker.to_string(),
            price,
            trading_day: None,
            source: "MOCK".to_string(),
            fetched_at: Utc::now(),
        })
    }

    async fn historical_daily_series(
        &self,
        ticker: &str,
    ) -> std::result::Result<Vec<DailyPrice>, MarketDataError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("daily:{}", ticker));
        self.check_failing(ticker)?;
        self.series
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(ticker.to_string()))
    }
}

// =============================================================================
// Price service
// =============================================================================

/// Price service with carry-forward lookups over in-memory closes.
#[derive(Default)]
pub struct MockPriceService {
    daily: Mutex<HashMap<String, BTreeMap<NaiveDate, Decimal>>>,
    failing: Mutex<HashSet<String>>,
    price_on_calls: Mutex<usize>,
}

impl MockPriceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_daily_price(&self, ticker: &str, date: NaiveDate, price: Decimal) {
        self.daily
            .lock()
            .unwrap()
            .entry(ticker.to_string())
            .or_default()
            .insert(date, price);
    }

    pub fn fail_for(&self, ticker: &str) {
        self.failing.lock().unwrap().insert(ticker.to_string());
    }

    pub fn price_on_calls(&self) -> usize {
        *self.price_on_calls.lock().unwrap()
    }

    fn check_failing(&self, ticker: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(ticker) {
            return Err(MarketDataError::SymbolNotFound(ticker.to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PriceServiceTrait for MockPriceService {
    async fn price(&self, ticker: &str) -> Result<Decimal> {
        self.check_failing(ticker)?;
        self.daily
            .lock()
            .unwrap()
            .get(ticker)
            .and_then(|prices| prices.values().next_back().copied())
            .ok_or_else(|| MarketDataError::SymbolNotFound(ticker.to_string()).into())
    }

    async fn historical_price(&self, ticker: &str) -> Result<HistoricalQuote> {
        self.check_failing(ticker)?;
        let prices = self
            .daily
            .lock()
            .unwrap()
            .get(ticker)
            .map(|prices| {
                prices
                    .iter()
                    .map(|(date, price)| DailyPrice::new(*date, *price))
                    .collect()
            })
            .unwrap_or_default();
        Ok(HistoricalQuote::new(ticker, prices, Utc::now()))
    }

    async fn price_on(&self, ticker: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        *self.price_on_calls.lock().unwrap() += 1;
        self.check_failing(ticker)?;
        Ok(self
            .daily
            .lock()
            .unwrap()
            .get(ticker)
            .and_then(|prices| prices.range(..=date).next_back().map(|(_, p)| *p)))
    }
}

// =============================================================================
// Repositories
// =============================================================================

#[derive(Default)]
pub struct MockUserRepository {
    users: Vec<User>,
}

impl MockUserRepository {
    pub fn with_users(ids: &[&str]) -> Self {
        Self {
            users: ids
                .iter()
                .map(|id| User {
                    id: id.to_string(),
                    email: format!("{}@example.com", id),
                })
                .collect(),
        }
    }
}

impl UserRepositoryTrait for MockUserRepository {
    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.clone())
    }
}

/// Portfolio repository keeping series in memory.
///
/// Creating a series links it to its portfolio, so the next recalculation
/// goes through `update_historical_performance`.
#[derive(Default)]
pub struct MockPortfolioRepository {
    portfolios: Mutex<Vec<Portfolio>>,
    series: Mutex<HashMap<String, HistoricalPortfolioPerformance>>,
    extra_tickers: Mutex<Vec<String>>,
    writes: Mutex<Vec<String>>,
    fail_on_write: AtomicBool,
    cancel_on_write: Mutex<Option<Arc<AtomicBool>>>,
}

impl MockPortfolioRepository {
    pub fn with_portfolios(portfolios: Vec<Portfolio>) -> Self {
        Self {
            portfolios: Mutex::new(portfolios),
            ..Default::default()
        }
    }

    /// Tickers reported by `all_tickers` on top of the transactions' ones.
    pub fn add_tickers(&self, tickers: &[&str]) {
        self.extra_tickers
            .lock()
            .unwrap()
            .extend(tickers.iter().map(|t| t.to_string()));
    }

    pub fn portfolio(&self, id: &str) -> Option<Portfolio> {
        self.portfolios
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn series_of(&self, portfolio_id: &str) -> Option<HistoricalPortfolioPerformance> {
        self.series
            .lock()
            .unwrap()
            .values()
            .find(|s| s.portfolio_id == portfolio_id)
            .cloned()
    }

    pub fn series_count(&self) -> usize {
        self.series.lock().unwrap().len()
    }

    /// Write operations in call order, as `create:PORTFOLIO` / `update:PORTFOLIO`.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Raises `flag` right after the next successful write.
    pub fn cancel_after_write(&self, flag: Arc<AtomicBool>) {
        *self.cancel_on_write.lock().unwrap() = Some(flag);
    }

    fn after_write(&self) {
        if let Some(flag) = self.cancel_on_write.lock().unwrap().take() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for MockPortfolioRepository {
    fn all_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        Ok(self
            .portfolios
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all_tickers(&self) -> Result<Vec<String>> {
        let mut tickers: Vec<String> = self
            .portfolios
            .lock()
            .unwrap()
            .iter()
            .flat_map(|p| p.transactions.iter().map(|t| t.ticker.clone()))
            .collect();
        tickers.extend(self.extra_tickers.lock().unwrap().iter().cloned());
        Ok(tickers)
    }

    async fn update_historical_performance(
        &self,
        historical_performance_id: &str,
        performances: &[DatedPortfolioPerformance],
    ) -> Result<HistoricalPortfolioPerformance> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(DatabaseError::WriteFailed("Intentional write failure".into()).into());
        }
        let updated = {
            let mut series = self.series.lock().unwrap();
            let existing = series.get_mut(historical_performance_id).ok_or_else(|| {
                Error::from(DatabaseError::NotFound(historical_performance_id.to_string()))
            })?;
            existing.performances = performances.to_vec();
            existing.calculated_at = Utc::now();
            existing.clone()
        };
        self.writes
            .lock()
            .unwrap()
            .push(format!("update:{}", updated.portfolio_id));
        self.after_write();
        Ok(updated)
    }

    async fn create_historical_performance(
        &self,
        portfolio_id: &str,
        performances: &[DatedPortfolioPerformance],
    ) -> Result<HistoricalPortfolioPerformance> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(DatabaseError::WriteFailed("Intentional write failure".into()).into());
        }
        let created = HistoricalPortfolioPerformance {
            id: format!("hp-{}", portfolio_id),
            portfolio_id: portfolio_id.to_string(),
            performances: performances.to_vec(),
            calculated_at: Utc::now(),
        };
        self.series
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        if let Some(p) = self
            .portfolios
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == portfolio_id)
        {
            p.historical_performance_id = Some(created.id.clone());
        }
        self.writes
            .lock()
            .unwrap()
            .push(format!("create:{}", portfolio_id));
        self.after_write();
        Ok(created)
    }
}
