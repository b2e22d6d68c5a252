use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::state::AppState;

// Background sweeper: reads already expire lazily, this keeps idle cities from piling up
pub async fn cache_sweeper(state: Arc<AppState>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?every, "cache sweeper started");

    loop {
        ticker.tick().await;

        let removed = state.sweep_caches();
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
    }
}
