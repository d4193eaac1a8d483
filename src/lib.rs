//! Stock watchlist viewer.
//!
//! A watchlist refreshed on a fixed interval, a (stock, period) selection and
//! a chart panel that keeps exactly one chart in sync with the selection.
//! Everything runs inside one viewer task; see [`services::viewer_service`].

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use api::{DataGateway, Gateway, MockGateway, QuotesClient};
pub use config::ViewerConfig;
pub use services::{ChartController, ChartRenderer, PlottersRenderer, Viewer, ViewerHandle};
pub use utils::ViewerError;
