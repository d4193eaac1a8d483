use tokio::sync::watch;
use tracing::debug;

use crate::models::{Period, Selection, Stock};

/// Holds the user's (stock, period) choice.
///
/// Subscribers are woken only when the identity of the selection changes,
/// so a refreshed quote for the selected symbol never triggers a redraw.
pub struct SelectionState {
    tx: watch::Sender<Selection>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Selection::default());
        Self { tx }
    }

    pub fn current(&self) -> Selection {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }

    /// Returns true if the selected symbol changed
    pub fn select_stock(&self, stock: Stock) -> bool {
        self.tx.send_if_modified(|selection| {
            let changed = selection.symbol() != Some(stock.symbol.as_str());
            if changed {
                debug!("Selected {}", stock.symbol);
            }
            selection.stock = Some(stock);
            changed
        })
    }

    pub fn clear_stock(&self) -> bool {
        self.tx.send_if_modified(|selection| selection.stock.take().is_some())
    }

    /// Returns true if the period changed
    pub fn set_period(&self, period: Period) -> bool {
        self.tx.send_if_modified(|selection| {
            if selection.period == period {
                return false;
            }
            debug!("Period set to {}", period);
            selection.period = period;
            true
        })
    }

    /// Swap in the latest quote for the selected symbol without notifying
    pub fn refresh_stock(&self, stocks: &[Stock]) {
        self.tx.send_if_modified(|selection| {
            if let Some(selected) = selection.stock.as_mut() {
                if let Some(fresh) = stocks.iter().find(|s| s.symbol == selected.symbol) {
                    *selected = fresh.clone();
                }
            }
            false
        });
    }
}
