//! Alpha Vantage market data provider implementation.
//!
//! - Spot prices via the GLOBAL_QUOTE endpoint
//! - Daily closing series via the TIME_SERIES_DAILY endpoint
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{DailyPrice, SpotPrice};
use crate::provider::PriceProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Free tier allowance.
const FREE_TIER_REQUESTS_PER_MINUTE: u32 = 5;

/// How much history TIME_SERIES_DAILY returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSize {
    /// Latest 100 data points (free tier)
    #[default]
    Compact,
    /// Full 20+ year history (premium)
    Full,
}

impl FromStr for OutputSize {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(MarketDataError::ValidationFailed {
                message: format!("unknown output size '{}'", other),
            }),
        }
    }
}

impl OutputSize {
    fn as_param(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Alpha Vantage price provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
    output_size: OutputSize,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
}

/// TIME_SERIES_DAILY response
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            output_size: OutputSize::default(),
        }
    }

    /// Point the provider at a different endpoint (proxies, recorded fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(MarketDataError::Network)
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // Both "Note" and "Information" carry the throttling message
        for msg in [note, information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage message: {}", msg);
        }

        Ok(())
    }

    fn parse_date(date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
    }

    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s.trim()).ok()
    }

    fn parse_global_quote(ticker: &str, text: &str) -> Result<SpotPrice, MarketDataError> {
        let response: GlobalQuoteResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        // An unknown symbol comes back as an empty "Global Quote" object
        let quote = response
            .global_quote
            .filter(|q| q.symbol.is_some())
            .ok_or_else(|| MarketDataError::SymbolNotFound(ticker.to_string()))?;

        let price = quote
            .price
            .as_deref()
            .and_then(Self::parse_decimal)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Missing or malformed price for {}", ticker),
            })?;

        if price <= Decimal::ZERO {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Non-positive price {} for {}", price, ticker),
            });
        }

        Ok(SpotPrice {
            ticker: ticker.to_string(),
            price,
            trading_day: quote.latest_trading_day.as_deref().and_then(Self::parse_date),
            source: PROVIDER_ID.to_string(),
            fetched_at: Utc::now(),
        })
    }

    fn parse_time_series(ticker: &str, text: &str) -> Result<Vec<DailyPrice>, MarketDataError> {
        let response: TimeSeriesResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response.time_series.ok_or_else(|| {
            MarketDataError::SymbolNotFound(format!("No data for symbol: {}", ticker))
        })?;

        let mut prices: Vec<DailyPrice> = time_series
            .into_iter()
            .filter_map(|(date_str, bar)| {
                let date = Self::parse_date(&date_str)?;
                let close = Self::parse_decimal(&bar.close)?;
                Some(DailyPrice::new(date, close))
            })
            .collect();

        if let Some(bad) = prices.iter().find(|p| p.price <= Decimal::ZERO) {
            return Err(MarketDataError::ValidationFailed {
                message: format!(
                    "Non-positive close {} for {} on {}",
                    bad.price, ticker, bad.date
                ),
            });
        }

        prices.sort_by_key(|p| p.date);

        Ok(prices)
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn requests_per_minute(&self) -> u32 {
        FREE_TIER_REQUESTS_PER_MINUTE
    }

    async fn spot_price(&self, ticker: &str) -> Result<SpotPrice, MarketDataError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", ticker)];
        let text = self.fetch(&params).await?;
        let spot = Self::parse_global_quote(ticker, &text)?;

        debug!("Alpha Vantage: spot price {} for {}", spot.price, ticker);

        Ok(spot)
    }

    async fn historical_daily_series(
        &self,
        ticker: &str,
    ) -> Result<Vec<DailyPrice>, MarketDataError> {
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", ticker),
            ("outputsize", self.output_size.as_param()),
        ];
        let text = self.fetch(&params).await?;
        let prices = Self::parse_time_series(ticker, &text)?;

        debug!(
            "Alpha Vantage: fetched {} daily prices for {}",
            prices.len(),
            ticker
        );

        Ok(prices)
    }
}
