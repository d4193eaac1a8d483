//! Chart panel models

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::ViewerError;

/// Labeled price series for one chart render
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

impl HistoricalSeries {
    pub fn new(labels: Vec<String>, prices: Vec<f64>) -> Self {
        Self { labels, prices }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Labels and prices must line up one to one
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.labels.len() != self.prices.len() {
            return Err(ViewerError::render(format!(
                "series has {} labels but {} prices",
                self.labels.len(),
                self.prices.len()
            )));
        }
        if self.prices.iter().any(|p| !p.is_finite()) {
            return Err(ViewerError::render("series contains non-finite prices"));
        }
        Ok(())
    }

    /// Lowest and highest price, `None` for an empty series
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.prices.is_empty() {
            return None;
        }
        let min = self.prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// The drawing target of the chart panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
        }
    }
}

/// A drawn chart bound to one surface.
///
/// Only the panel controller holds these. Once `release` has run the image
/// is gone and the handle is inert.
#[derive(Debug)]
pub struct ChartHandle {
    id: Uuid,
    surface_id: Uuid,
    label: String,
    series: HistoricalSeries,
    image: Option<Arc<Vec<u8>>>,
}

impl ChartHandle {
    pub fn new(surface: &Surface, label: &str, series: HistoricalSeries, image: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            surface_id: surface.id,
            label: label.to_string(),
            series,
            image: Some(Arc::new(image)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surface_id(&self) -> Uuid {
        self.surface_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn series(&self) -> &HistoricalSeries {
        &self.series
    }

    pub fn image(&self) -> Option<Arc<Vec<u8>>> {
        self.image.clone()
    }

    pub fn is_live(&self) -> bool {
        self.image.is_some()
    }

    /// Drops the rendered image. Returns false if already released.
    pub fn release(&mut self) -> bool {
        self.image.take().is_some()
    }
}
