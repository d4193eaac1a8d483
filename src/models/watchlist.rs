use chrono::{DateTime, Utc};

use super::Stock;

/// Latest watchlist as published to the view layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchlistState {
    pub stocks: Vec<Stock>,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}
