//! Data models shared by the viewer services and the bot commands
//!
//! Quotes and series come from the data gateway; selection, panel and
//! watchlist state are owned by the viewer and published to the view layer.

pub mod stock;
pub mod period;
pub mod selection;
pub mod chart;
pub mod panel;
pub mod watchlist;

pub use stock::{Stock, Trend};
pub use period::Period;
pub use selection::{Selection, SelectionKey};
pub use chart::{ChartHandle, HistoricalSeries, Surface};
pub use panel::{ChartView, PanelState};
pub use watchlist::WatchlistState;
