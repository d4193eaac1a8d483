use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::api::DataGateway;
use crate::models::{Stock, WatchlistState};
use crate::utils::ViewerError;

/// Latest list of stocks. Refreshes replace the list wholesale; a failed
/// refresh keeps the previous list and publishes the error instead.
pub struct WatchlistStore {
    state: watch::Sender<WatchlistState>,
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(WatchlistState::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchlistState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WatchlistState {
        self.state.borrow().clone()
    }

    pub fn stocks(&self) -> Vec<Stock> {
        self.state.borrow().stocks.clone()
    }

    /// Case-insensitive symbol lookup
    pub fn find(&self, symbol: &str) -> Option<Stock> {
        self.state
            .borrow()
            .stocks
            .iter()
            .find(|stock| stock.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    /// Returns true if the list was replaced
    pub fn apply_refresh(&self, result: Result<Vec<Stock>, ViewerError>) -> bool {
        match result {
            Ok(stocks) => {
                info!("📋 Watchlist refreshed: {} stocks", stocks.len());
                self.state.send_modify(|state| {
                    state.stocks = stocks;
                    state.error = None;
                    state.refreshed_at = Some(Utc::now());
                });
                true
            }
            Err(e) => {
                warn!("Watchlist refresh failed: {}", e);
                self.state.send_modify(|state| state.error = Some(e.to_string()));
                false
            }
        }
    }

    pub async fn refresh<G: DataGateway>(&self, gateway: &G) -> bool {
        let result = gateway.fetch_stocks().await;
        self.apply_refresh(result)
    }
}

/// Periodic refresh trigger with an explicit start/stop lifecycle.
///
/// The first tick after `start` fires immediately.
pub struct RefreshSchedule {
    period: Duration,
    interval: Option<Interval>,
}

impl RefreshSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn start(&mut self) {
        if self.interval.is_none() {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Resolves on the next tick; never resolves while stopped
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
