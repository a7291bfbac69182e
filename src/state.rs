use crate::aggregate::build_board_at;
use crate::fetch::OrderSource;
use crate::models::BoardView;
use chrono::Utc;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    Failed,
    Queued,
    Skipped,
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn OrderSource>,
    pub view: Arc<RwLock<BoardView>>,
    pub app_version: i64,
    refresh_lock: Arc<Mutex<()>>,
    pending: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(source: Arc<dyn OrderSource>, auto_refresh: bool, app_version: i64) -> Self {
        Self {
            source,
            view: Arc::new(RwLock::new(BoardView {
                auto_refresh,
                ..BoardView::default()
            })),
            app_version,
            refresh_lock: Arc::new(Mutex::new(())),
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn snapshot(&self) -> BoardView {
        self.view.read().await.clone()
    }

    pub async fn auto_refresh(&self) -> bool {
        self.view.read().await.auto_refresh
    }

    // Returns true when this call switched auto refresh on.
    pub async fn set_auto_refresh(&self, enabled: bool) -> bool {
        self.update_auto_refresh(|_| enabled).await
    }

    pub async fn toggle_auto_refresh(&self) -> bool {
        self.update_auto_refresh(|current| !current).await
    }

    async fn update_auto_refresh(&self, next: impl FnOnce(bool) -> bool) -> bool {
        let mut view = self.view.write().await;
        let was_enabled = view.auto_refresh;
        view.auto_refresh = next(was_enabled);
        let enabled = view.auto_refresh;
        drop(view);

        if enabled != was_enabled {
            info!(enabled, "auto refresh changed");
        }
        enabled && !was_enabled
    }

    pub async fn refresh_if_idle(&self) -> RefreshOutcome {
        match self.run_exclusive().await {
            Some(outcome) => outcome,
            None => {
                debug!("refresh already in flight, tick skipped");
                RefreshOutcome::Skipped
            }
        }
    }

    // A request made during a running refresh causes one more refresh after
    // it, so the newest request is what lands.
    pub async fn request_refresh(&self) -> RefreshOutcome {
        // Must be set before trying the lock so the running refresh sees it.
        self.pending.store(true, Ordering::SeqCst);
        match self.run_exclusive().await {
            Some(outcome) => outcome,
            None => {
                info!("refresh in flight, request queued");
                RefreshOutcome::Queued
            }
        }
    }

    async fn run_exclusive(&self) -> Option<RefreshOutcome> {
        let mut last = None;
        loop {
            let Ok(guard) = self.refresh_lock.try_lock() else {
                return last;
            };
            self.pending.store(false, Ordering::SeqCst);
            last = Some(self.refresh_once().await);
            drop(guard);

            if !self.pending.load(Ordering::SeqCst) {
                return last;
            }
            debug!("running queued refresh");
        }
    }

    async fn refresh_once(&self) -> RefreshOutcome {
        self.view.write().await.refreshing = true;
        let result = self.source.fetch_orders().await;
        let now = Utc::now();

        match result {
            Ok(orders) => {
                let board = build_board_at(&orders, now);
                let listed: usize = board.buckets.values().map(|bucket| bucket.orders.len()).sum();
                info!(
                    received = orders.len(),
                    listed,
                    week = board.week_number,
                    "board refreshed"
                );

                let mut view = self.view.write().await;
                view.refreshing = false;
                view.board = Some(board);
                view.last_updated = Some(now);
                view.error = None;
                RefreshOutcome::Updated
            }
            Err(err) => {
                error!(source = %self.source.describe(), "refresh failed: {err}");

                let mut view = self.view.write().await;
                view.refreshing = false;
                view.error = Some(err.user_message());
                RefreshOutcome::Failed
            }
        }
    }
}
