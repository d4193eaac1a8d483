pub mod chart_service;
pub mod panel_service;
pub mod selection_service;
pub mod watchlist_service;
pub mod viewer_service;

pub use chart_service::{ChartRenderer, PlottersRenderer};
pub use panel_service::{ChartController, HistoricalRequest, Redraw, RedrawOutcome};
pub use selection_service::SelectionState;
pub use watchlist_service::{RefreshSchedule, WatchlistStore};
pub use viewer_service::{Viewer, ViewerHandle};
