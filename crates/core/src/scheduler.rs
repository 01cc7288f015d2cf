//! Background scheduler for the periodic performance update.
//!
//! Waits an initial delay, then runs the batch update once per interval.
//! Each run is awaited before the next tick, so runs never overlap.

use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::portfolio::performance::PerformanceUpdaterTrait;

/// Shortest interval the scheduler accepts.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Starts the background performance update scheduler.
///
/// The first run happens after `initial_delay`, later ones every `interval`.
/// A tick missed because a run took longer than `interval` is skipped.
/// Intervals below [`MIN_UPDATE_INTERVAL`] are raised to it.
pub fn start_performance_update_scheduler(
    updater: Arc<dyn PerformanceUpdaterTrait>,
    update_interval: Duration,
    initial_delay: Duration,
) -> JoinHandle<()> {
    let update_interval = if update_interval < MIN_UPDATE_INTERVAL {
        warn!(
            "Update interval {:?} is below the minimum, using {:?}",
            update_interval, MIN_UPDATE_INTERVAL
        );
        MIN_UPDATE_INTERVAL
    } else {
        update_interval
    };

    tokio::spawn(async move {
        info!(
            "Performance update scheduler started ({:?} interval)",
            update_interval
        );

        tokio::time::sleep(initial_delay).await;

        // First tick is immediate
        let mut ticker = interval(update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_scheduled_update(updater.as_ref()).await;
        }
    })
}

async fn run_scheduled_update(updater: &dyn PerformanceUpdaterTrait) {
    info!("Running scheduled performance update...");

    match updater.update_performance_of_all_portfolios().await {
        Ok(summary) => {
            info!(
                "Scheduled performance update completed: {} portfolios recomputed",
                summary.portfolios_recalculated
            );
        }
        Err(e) => {
            warn!("Scheduled performance update failed: {}", e);
        }
    }
}
