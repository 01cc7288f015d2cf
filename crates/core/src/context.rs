//! Wiring of the performance pipeline from a [`PerformanceConfig`].
//!
//! Hosts supply the storage implementations; everything else (provider,
//! rate limiter, price services, updater) is built here.

use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;

use stockfolio_market_data::{AlphaVantageProvider, PriceProvider, RateLimiter};

use crate::config::PerformanceConfig;
use crate::errors::Result;
use crate::portfolio::performance::{PerformanceUpdater, PerformanceUpdaterTrait};
use crate::portfolio::{PortfolioRepositoryTrait, UserRepositoryTrait};
use crate::quotes::{CachedPriceService, LivePriceService, PriceServiceTrait, QuoteStore};
use crate::scheduler::start_performance_update_scheduler;
use crate::utils::time_utils::{Clock, SystemClock};

pub struct PerformanceContext {
    pub config: PerformanceConfig,
    pub rate_limiter: Arc<RateLimiter>,
    pub price_service: Arc<CachedPriceService>,
    pub updater: Arc<PerformanceUpdater>,
}

impl PerformanceContext {
    /// Builds the pipeline against Alpha Vantage and the wall clock.
    pub fn new(
        config: PerformanceConfig,
        user_repository: Arc<dyn UserRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        quote_store: Arc<dyn QuoteStore>,
    ) -> Result<Self> {
        let provider = Arc::new(
            AlphaVantageProvider::new(config.alpha_vantage_api_key.clone())
                .with_output_size(config.alpha_vantage_output_size),
        );
        let clock = Arc::new(SystemClock::new(config.valuation_timezone));
        Self::with_provider(
            config,
            provider,
            clock,
            user_repository,
            portfolio_repository,
            quote_store,
        )
    }

    /// Builds the pipeline against any provider and clock.
    pub fn with_provider(
        config: PerformanceConfig,
        provider: Arc<dyn PriceProvider>,
        clock: Arc<dyn Clock>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        quote_store: Arc<dyn QuoteStore>,
    ) -> Result<Self> {
        config.validate()?;

        // Never above what the provider itself allows
        let requests_per_minute = config
            .requests_per_minute
            .min(provider.requests_per_minute());
        let rate_limiter = Arc::new(RateLimiter::per_minute(requests_per_minute));

        let live: Arc<dyn PriceServiceTrait> = Arc::new(LivePriceService::new(
            provider.clone(),
            rate_limiter.clone(),
            clock.clone(),
        ));
        let price_service = Arc::new(CachedPriceService::new(
            quote_store.clone(),
            live,
            clock.clone(),
            config.quote_ttl,
        ));
        let updater = Arc::new(PerformanceUpdater::new(
            user_repository,
            portfolio_repository,
            quote_store,
            price_service.clone(),
            clock,
            config.ticker_failure_policy,
        ));

        info!(
            "Performance pipeline ready: provider {}, {} requests/min, quote TTL {}h, timezone {}, {:?} history",
            provider.id(),
            requests_per_minute,
            config.quote_ttl.num_hours(),
            config.valuation_timezone,
            config.alpha_vantage_output_size
        );

        Ok(Self {
            config,
            rate_limiter,
            price_service,
            updater,
        })
    }

    /// Spawns the periodic update with the configured interval and delay.
    pub fn start_scheduler(&self) -> JoinHandle<()> {
        let updater: Arc<dyn PerformanceUpdaterTrait> = self.updater.clone();
        start_performance_update_scheduler(
            updater,
            self.config.update_interval,
            self.config.update_initial_delay,
        )
    }
}
