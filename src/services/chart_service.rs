use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{ChartHandle, HistoricalSeries, Surface};
use crate::utils::ViewerError;

/// Panel background (gray-800)
const BACKGROUND: RGBColor = RGBColor(31, 41, 55);
/// Series line and points
const LINE: RGBColor = RGBColor(102, 126, 234);
/// Axis labels, caption and grid
const TEXT: RGBColor = RGBColor(229, 231, 235);

/// Draws line charts onto a surface.
///
/// `destroy` must be safe to call on a handle that was already destroyed.
pub trait ChartRenderer: Send + 'static {
    fn create(
        &mut self,
        surface: &Surface,
        series: &HistoricalSeries,
        label: &str,
    ) -> Result<ChartHandle, ViewerError>;

    fn destroy(&mut self, handle: &mut ChartHandle);
}

/// Renders PNG line charts with plotters
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    scratch_dir: PathBuf,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlottersRenderer {
    pub fn new() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn create(
        &mut self,
        surface: &Surface,
        series: &HistoricalSeries,
        label: &str,
    ) -> Result<ChartHandle, ViewerError> {
        series.validate()?;
        if series.is_empty() {
            return Err(ViewerError::render("no price data to chart"));
        }

        let temp_file = self
            .scratch_dir
            .join(format!("stock_viewer_chart_{}.png", Uuid::new_v4()));

        let drawn = draw_line_chart(&temp_file, surface, series, label);
        let image = drawn.and_then(|_| {
            fs::read(&temp_file).map_err(|e| ViewerError::render(format!("Failed to read chart file: {}", e)))
        });

        if let Err(e) = fs::remove_file(&temp_file) {
            warn!("Failed to delete temporary chart file {}: {}", temp_file.display(), e);
        }

        let image = image?;
        debug!("🎨 Rendered {} chart: {} points, {} bytes", label, series.len(), image.len());
        Ok(ChartHandle::new(surface, label, series.clone(), image))
    }

    fn destroy(&mut self, handle: &mut ChartHandle) {
        if handle.release() {
            debug!("🧹 Released chart {} ({})", handle.id(), handle.label());
        }
    }
}

fn draw_line_chart(
    path: &Path,
    surface: &Surface,
    series: &HistoricalSeries,
    label: &str,
) -> Result<(), ViewerError> {
    let backend = BitMapBackend::new(path, (surface.width, surface.height));
    let root = backend.into_drawing_area();
    root.fill(&BACKGROUND)
        .map_err(|e| ViewerError::render(format!("Failed to fill canvas: {}", e)))?;

    let (y_min, y_max) = padded_range(series)
        .ok_or_else(|| ViewerError::render("no price data to chart"))?;
    let x_max = series.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(label, ("sans-serif", 28.0).into_font().color(&TEXT))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(|e| ViewerError::render(format!("Failed to build chart: {}", e)))?;

    let labels = &series.labels;
    chart
        .configure_mesh()
        .bold_line_style(TEXT.mix(0.1).stroke_width(1))
        .light_line_style(BACKGROUND.stroke_width(1))
        .axis_style(TEXT.mix(0.4).stroke_width(1))
        .label_style(("sans-serif", 14.0).into_font().color(&TEXT))
        .x_labels(labels.len().clamp(2, 12))
        .x_label_formatter(&|x: &f64| label_at(labels, *x))
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()
        .map_err(|e| ViewerError::render(format!("Failed to draw mesh: {}", e)))?;

    let points: Vec<(f64, f64)> = series
        .prices
        .iter()
        .enumerate()
        .map(|(i, price)| (i as f64, *price))
        .collect();

    chart
        .draw_series(
            AreaSeries::new(points.iter().copied(), y_min, LINE.mix(0.25).filled())
                .border_style(LINE.stroke_width(2)),
        )
        .map_err(|e| ViewerError::render(format!("Failed to draw line: {}", e)))?;

    chart
        .draw_series(points.iter().map(|point| Circle::new(*point, 3, LINE.filled())))
        .map_err(|e| ViewerError::render(format!("Failed to draw points: {}", e)))?;

    root.present()
        .map_err(|e| ViewerError::render(format!("Failed to render chart: {}", e)))?;

    Ok(())
}

/// Price range with 10% headroom, clamped at zero
fn padded_range(series: &HistoricalSeries) -> Option<(f64, f64)> {
    let (min_price, max_price) = series.price_range()?;
    let price_range = (max_price - min_price)
        .max(max_price.abs() * 0.01)
        .max(1e-8);
    let padding = price_range * 0.1;
    Some(((min_price - padding).max(0.0), max_price + padding))
}

/// Axis label for an x position; positions between points get no label
fn label_at(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}
