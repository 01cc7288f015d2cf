use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::{Mutex, MutexGuard};

/// Default timezone for valuation dates.
/// This is the canonical timezone used to decide which calendar day "today" is.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a valuation date in the given timezone.
///
/// This is the single source of truth for converting instants to domain dates.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Source of the current instant and calendar day.
///
/// Services take a clock instead of calling `Utc::now()` so cache ages and
/// series end dates can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Valuation timezone used to derive [`Clock::today`].
    fn timezone(&self) -> Tz;

    fn today(&self) -> NaiveDate {
        valuation_date_from_utc(self.now(), self.timezone())
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_VALUATION_TZ)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_timezone(now, chrono_tz::UTC)
    }

    pub fn with_timezone(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now: Mutex::new(now),
            tz,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Every calendar day from `start` through `end`, both inclusive.
///
/// Steps by calendar day, so DST transitions neither skip nor repeat a day.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut current = start;
    while current <= end {
        days.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}
