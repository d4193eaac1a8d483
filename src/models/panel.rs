use std::sync::Arc;

use uuid::Uuid;

use super::{HistoricalSeries, Period};

/// What the chart panel currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub chart_id: Uuid,
    pub symbol: String,
    pub period: Period,
    pub series: HistoricalSeries,
    /// PNG bytes
    pub image: Arc<Vec<u8>>,
}

/// Loading/error overlays plus the chart, published for the view layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    /// Request generation this state belongs to
    pub generation: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub chart: Option<ChartView>,
}

impl PanelState {
    /// True once the request `generation` finished or got superseded
    pub fn settled_for(&self, generation: u64) -> bool {
        self.generation > generation || (self.generation == generation && !self.loading)
    }
}
