use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::performance_calculator::calculate_performance;
use super::performance_model::{DatedPortfolioPerformance, HistoricalPortfolioPerformance};
use super::price_cache::TickerPriceCache;
use crate::config::TickerFailurePolicy;
use crate::errors::{Error, Result};
use crate::portfolio::{Portfolio, PortfolioRepositoryTrait, UserRepositoryTrait};
use crate::quotes::{CachedPriceService, QuoteStore};
use crate::utils::time_utils::{self, Clock};

/// Outcome of one batch update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub tickers_refreshed: usize,
    pub tickers_skipped: Vec<String>,
    pub portfolios_recalculated: usize,
    /// Portfolios left on their previous series; only filled under
    /// [`TickerFailurePolicy::Skip`].
    pub portfolios_failed: Vec<String>,
}

#[async_trait]
pub trait PerformanceUpdaterTrait: Send + Sync {
    /// Refreshes the price cache of every traded ticker, then recomputes the
    /// performance series of every portfolio of every user.
    ///
    /// Runs sequentially. With [`TickerFailurePolicy::Abort`] the first failing
    /// ticker stops the run before any portfolio is touched, and the first
    /// failing portfolio stops the rest. With [`TickerFailurePolicy::Skip`]
    /// both are logged and recorded in the summary, and the run continues.
    async fn update_performance_of_all_portfolios(&self) -> Result<UpdateSummary>;

    /// Recomputes one portfolio from its first transaction through today and
    /// replaces its stored series.
    ///
    /// Nothing is written if any day fails, so the previous series survives.
    async fn recalculate_performance(
        &self,
        portfolio: &Portfolio,
    ) -> Result<HistoricalPortfolioPerformance>;
}

pub struct PerformanceUpdater {
    user_repository: Arc<dyn UserRepositoryTrait>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    quote_store: Arc<dyn QuoteStore>,
    price_service: Arc<CachedPriceService>,
    clock: Arc<dyn Clock>,
    ticker_failure_policy: TickerFailurePolicy,
    cancel_requested: Arc<AtomicBool>,
}

impl PerformanceUpdater {
    pub fn new(
        user_repository: Arc<dyn UserRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        quote_store: Arc<dyn QuoteStore>,
        price_service: Arc<CachedPriceService>,
        clock: Arc<dyn Clock>,
        ticker_failure_policy: TickerFailurePolicy,
    ) -> Self {
        Self {
            user_repository,
            portfolio_repository,
            quote_store,
            price_service,
            clock,
            ticker_failure_policy,
            cancel_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Asks the running batch update to stop at the next ticker or portfolio
    /// boundary. Has no effect on a run started afterwards.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Shared flag behind [`PerformanceUpdater::cancel`], for callers that do
    /// not hold the updater itself.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_requested)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel_requested.load(Ordering::SeqCst) {
            warn!("Performance update cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    async fn refresh_prices(&self, summary: &mut UpdateSummary) -> Result<()> {
        let mut tickers = self.portfolio_repository.all_tickers()?;
        tickers.sort();
        tickers.dedup();

        info!("Refreshing prices of {} tickers", tickers.len());

        for ticker in &tickers {
            self.check_cancelled()?;

            match self.price_service.refresh(ticker).await {
                Ok(_) => summary.tickers_refreshed += 1,
                Err(e) => match self.ticker_failure_policy {
                    TickerFailurePolicy::Abort => {
                        warn!("Refreshing {} failed, aborting update: {}", ticker, e);
                        return Err(e);
                    }
                    TickerFailurePolicy::Skip => {
                        warn!("Refreshing {} failed, skipping it: {}", ticker, e);
                        summary.tickers_skipped.push(ticker.clone());
                    }
                },
            }
        }

        Ok(())
    }

    async fn recompute_all(&self, summary: &mut UpdateSummary) -> Result<()> {
        let users = self.user_repository.all_users()?;

        for user in &users {
            let portfolios = self.portfolio_repository.all_portfolios(&user.id)?;
            debug!(
                "Recomputing {} portfolios of user {}",
                portfolios.len(),
                user.id
            );

            for portfolio in &portfolios {
                self.check_cancelled()?;

                match self.recalculate_performance(portfolio).await {
                    Ok(_) => summary.portfolios_recalculated += 1,
                    Err(e) => match self.ticker_failure_policy {
                        TickerFailurePolicy::Abort => return Err(e),
                        TickerFailurePolicy::Skip => {
                            warn!(
                                "Recomputing portfolio {} failed, keeping its previous series: {}",
                                portfolio.id, e
                            );
                            summary.portfolios_failed.push(portfolio.id.clone());
                        }
                    },
                }
            }
        }

        Ok(())
    }

    /// Seeds the memo with every cached daily close of the portfolio's tickers.
    fn seed_price_cache(&self, portfolio: &Portfolio) -> Result<TickerPriceCache> {
        let mut cache = TickerPriceCache::new();
        for ticker in portfolio.tickers() {
            if let Some(series) = self.quote_store.get_historical_quote(&ticker)? {
                cache.extend_from_series(&series);
            }
        }
        Ok(cache)
    }
}

#[async_trait]
impl PerformanceUpdaterTrait for PerformanceUpdater {
    async fn update_performance_of_all_portfolios(&self) -> Result<UpdateSummary> {
        let start = Instant::now();
        self.cancel_requested.store(false, Ordering::SeqCst);
        let mut summary = UpdateSummary::default();

        info!("Performance update: refreshing prices");
        self.refresh_prices(&mut summary).await?;

        info!("Performance update: recomputing portfolios");
        self.recompute_all(&mut summary).await?;

        info!(
            "Performance update done in {:?}: {} tickers refreshed, {} skipped, {} portfolios recomputed, {} failed",
            start.elapsed(),
            summary.tickers_refreshed,
            summary.tickers_skipped.len(),
            summary.portfolios_recalculated,
            summary.portfolios_failed.len()
        );
        Ok(summary)
    }

    async fn recalculate_performance(
        &self,
        portfolio: &Portfolio,
    ) -> Result<HistoricalPortfolioPerformance> {
        let today = self.clock.today();
        let start_date = portfolio
            .earliest_transaction_date()
            .map_or(today, |earliest| earliest.min(today));

        let mut price_cache = self.seed_price_cache(portfolio)?;
        let days = time_utils::get_days_between(start_date, today);
        let mut performances: Vec<DatedPortfolioPerformance> = Vec::with_capacity(days.len());

        for date in days {
            let performance = calculate_performance(
                portfolio,
                date,
                &mut price_cache,
                self.price_service.as_ref(),
            )
            .await?;
            performances.push(performance);
        }

        let saved = match portfolio.historical_performance_id.as_deref() {
            Some(id) => {
                self.portfolio_repository
                    .update_historical_performance(id, &performances)
                    .await?
            }
            None => {
                self.portfolio_repository
                    .create_historical_performance(&portfolio.id, &performances)
                    .await?
            }
        };

        debug!(
            "Recomputed portfolio {}: {} days from {} to {}",
            portfolio.id,
            performances.len(),
            start_date,
            today
        );
        Ok(saved)
    }
}
