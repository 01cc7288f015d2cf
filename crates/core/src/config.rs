//! Runtime configuration for the performance pipeline.
//!
//! Built once at startup from `STOCKFOLIO_*` environment variables (a `.env`
//! file is honoured) and validated eagerly, so a bad value fails at boot
//! rather than in the middle of a nightly run.

use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use chrono_tz::Tz;
use log::debug;
use stockfolio_market_data::OutputSize;

use crate::errors::{Error, Result};
use crate::utils::time_utils::DEFAULT_VALUATION_TZ;

pub const ENV_API_KEY: &str = "STOCKFOLIO_ALPHA_VANTAGE_API_KEY";
pub const ENV_REQUESTS_PER_MINUTE: &str = "STOCKFOLIO_REQUESTS_PER_MINUTE";
pub const ENV_QUOTE_TTL_HOURS: &str = "STOCKFOLIO_QUOTE_TTL_HOURS";
pub const ENV_UPDATE_INTERVAL_SECS: &str = "STOCKFOLIO_UPDATE_INTERVAL_SECS";
pub const ENV_UPDATE_INITIAL_DELAY_SECS: &str = "STOCKFOLIO_UPDATE_INITIAL_DELAY_SECS";
pub const ENV_TIMEZONE: &str = "STOCKFOLIO_TIMEZONE";
pub const ENV_TICKER_FAILURE_POLICY: &str = "STOCKFOLIO_TICKER_FAILURE_POLICY";
pub const ENV_ALPHA_VANTAGE_OUTPUT_SIZE: &str = "STOCKFOLIO_ALPHA_VANTAGE_OUTPUT_SIZE";

/// Alpha Vantage free tier.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;
pub const DEFAULT_QUOTE_TTL_HOURS: i64 = 24;
/// Nightly.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_UPDATE_INITIAL_DELAY_SECS: u64 = 60;

/// What the batch update does when refreshing one ticker fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickerFailurePolicy {
    /// Abort the whole run; no portfolio is recomputed.
    #[default]
    Abort,
    /// Log the failure and keep refreshing the remaining tickers.
    Skip,
}

impl FromStr for TickerFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(TickerFailurePolicy::Abort),
            "skip" => Ok(TickerFailurePolicy::Skip),
            other => Err(Error::InvalidConfigValue(format!(
                "{}: expected 'abort' or 'skip', got '{}'",
                ENV_TICKER_FAILURE_POLICY, other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    pub alpha_vantage_api_key: String,
    pub requests_per_minute: u32,
    pub quote_ttl: Duration,
    pub update_interval: StdDuration,
    pub update_initial_delay: StdDuration,
    pub valuation_timezone: Tz,
    pub ticker_failure_policy: TickerFailurePolicy,
    /// History depth of daily series fetches. `Compact` only covers about
    /// 100 trading days; older holdings fail with a missing price.
    pub alpha_vantage_output_size: OutputSize,
}

impl PerformanceConfig {
    /// Defaults for everything except the API key.
    pub fn new(alpha_vantage_api_key: impl Into<String>) -> Self {
        Self {
            alpha_vantage_api_key: alpha_vantage_api_key.into(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            quote_ttl: Duration::hours(DEFAULT_QUOTE_TTL_HOURS),
            update_interval: StdDuration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
            update_initial_delay: StdDuration::from_secs(DEFAULT_UPDATE_INITIAL_DELAY_SECS),
            valuation_timezone: DEFAULT_VALUATION_TZ,
            ticker_failure_policy: TickerFailurePolicy::default(),
            alpha_vantage_output_size: OutputSize::default(),
        }
    }

    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every setting through `lookup` and validates the result.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = read(ENV_API_KEY).ok_or_else(|| Error::MissingConfigKey(ENV_API_KEY.into()))?;
        let mut config = Self::new(api_key);

        if let Some(raw) = read(ENV_REQUESTS_PER_MINUTE) {
            config.requests_per_minute = parse_number(ENV_REQUESTS_PER_MINUTE, &raw)?;
        }
        if let Some(raw) = read(ENV_QUOTE_TTL_HOURS) {
            let hours: i64 = parse_number(ENV_QUOTE_TTL_HOURS, &raw)?;
            config.quote_ttl = Duration::try_hours(hours).ok_or_else(|| {
                Error::InvalidConfigValue(format!("{}: '{}' is out of range", ENV_QUOTE_TTL_HOURS, raw))
            })?;
        }
        if let Some(raw) = read(ENV_UPDATE_INTERVAL_SECS) {
            config.update_interval =
                StdDuration::from_secs(parse_number(ENV_UPDATE_INTERVAL_SECS, &raw)?);
        }
        if let Some(raw) = read(ENV_UPDATE_INITIAL_DELAY_SECS) {
            config.update_initial_delay =
                StdDuration::from_secs(parse_number(ENV_UPDATE_INITIAL_DELAY_SECS, &raw)?);
        }
        if let Some(raw) = read(ENV_TIMEZONE) {
            config.valuation_timezone = raw.parse::<Tz>().map_err(|_| {
                Error::InvalidConfigValue(format!("{}: unknown timezone '{}'", ENV_TIMEZONE, raw))
            })?;
        }
        if let Some(raw) = read(ENV_TICKER_FAILURE_POLICY) {
            config.ticker_failure_policy = raw.parse()?;
        }
        if let Some(raw) = read(ENV_ALPHA_VANTAGE_OUTPUT_SIZE) {
            config.alpha_vantage_output_size = raw.parse().map_err(|_| {
                Error::InvalidConfigValue(format!(
                    "{}: expected 'compact' or 'full', got '{}'",
                    ENV_ALPHA_VANTAGE_OUTPUT_SIZE, raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_api_key.trim().is_empty() {
            return Err(Error::MissingConfigKey(ENV_API_KEY.into()));
        }
        if self.requests_per_minute == 0 {
            return Err(Error::InvalidConfigValue(format!(
                "{} must be greater than zero",
                ENV_REQUESTS_PER_MINUTE
            )));
        }
        if self.quote_ttl <= Duration::zero() {
            return Err(Error::InvalidConfigValue(format!(
                "{} must be greater than zero",
                ENV_QUOTE_TTL_HOURS
            )));
        }
        if self.update_interval.is_zero() {
            return Err(Error::InvalidConfigValue(format!(
                "{} must be greater than zero",
                ENV_UPDATE_INTERVAL_SECS
            )));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| Error::InvalidConfigValue(format!("{}: '{}' is not a valid number", key, raw)))
}
