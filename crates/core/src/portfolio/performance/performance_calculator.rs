use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::performance_model::DatedPortfolioPerformance;
use super::price_cache::TickerPriceCache;
use crate::errors::{CalculatorError, Result};
use crate::portfolio::{Portfolio, Transaction};
use crate::quotes::service::ensure_positive;
use crate::quotes::PriceServiceTrait;

/// Calculates invested capital and market value of a portfolio on one day.
///
/// Only transactions purchased on or before `date` count. Prices come from
/// `price_cache` first; misses go to `price_service` and are memoised back
/// into the cache. A held transaction whose ticker has no price at or before
/// `date` (the day predates the provider's history) fails the day with
/// [`CalculatorError::MissingPrice`].
///
/// # Arguments
///
/// * `portfolio` - Portfolio with its transactions loaded.
/// * `date` - Calendar day to value.
/// * `price_cache` - Memo shared across the days of one recalculation.
/// * `price_service` - Fallback for prices missing from the memo.
///
pub async fn calculate_performance(
    portfolio: &Portfolio,
    date: NaiveDate,
    price_cache: &mut TickerPriceCache,
    price_service: &dyn PriceServiceTrait,
) -> Result<DatedPortfolioPerformance> {
    let mut invested = Decimal::ZERO;
    let mut value = Decimal::ZERO;

    for transaction in portfolio.transactions.iter().filter(|t| t.is_held_on(date)) {
        transaction.validate()?;

        if transaction.currency != portfolio.currency {
            debug!(
                "Transaction {} is in {} but portfolio {} is in {}; amounts are summed unconverted",
                transaction.id, transaction.currency, portfolio.id, portfolio.currency
            );
        }

        invested += transaction.cost();

        let price = price_for(transaction, date, price_cache, price_service).await?;
        value += transaction.shares * price;
    }

    Ok(DatedPortfolioPerformance::new(date, invested, value))
}

async fn price_for(
    transaction: &Transaction,
    date: NaiveDate,
    price_cache: &mut TickerPriceCache,
    price_service: &dyn PriceServiceTrait,
) -> Result<Decimal> {
    let ticker = transaction.ticker.as_str();

    if let Some(cached) = price_cache.get(ticker, date) {
        return ensure_positive(ticker, cached);
    }

    match price_service.price_on(ticker, date).await? {
        Some(price) => {
            let price = ensure_positive(ticker, price)?;
            price_cache.insert(ticker, date, price);
            Ok(price)
        }
        None => {
            warn!(
                "No market price for {} on or before {} (transaction {})",
                ticker, date, transaction.id
            );
            Err(CalculatorError::MissingPrice {
                ticker: ticker.to_string(),
                date,
            }
            .into())
        }
    }
}
