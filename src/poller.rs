use crate::fetch::OrderSource;
use crate::state::AppState;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

pub async fn run_poller(state: AppState, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut initial = true;

    info!(
        period_secs = period.as_secs(),
        source = %state.source.describe(),
        "poller started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        // The first tick always loads the board.
        if !initial && !state.auto_refresh().await {
            continue;
        }
        initial = false;

        tokio::select! {
            _ = state.refresh_if_idle() => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("poller stopped");
}
