//! Chart panel lifecycle.
//!
//! `ChartController` is the only owner of the live `ChartHandle`. A redraw is
//! split in two halves around the asynchronous fetch: `request_redraw` opens a
//! new request generation and `complete_redraw` applies the fetched series if
//! that generation is still current. Anything that invalidates the panel
//! (hiding it, clearing the selection, a newer request) bumps the generation,
//! so late responses are dropped without side effects.

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chart_service::ChartRenderer;
use crate::models::{ChartHandle, ChartView, HistoricalSeries, PanelState, Period, Selection, SelectionKey, Surface};
use crate::utils::ViewerError;

/// Historical fetch the caller has to perform for a redraw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalRequest {
    pub generation: u64,
    pub symbol: String,
    pub period: Period,
}

impl HistoricalRequest {
    fn key(&self) -> SelectionKey {
        SelectionKey {
            symbol: self.symbol.clone(),
            period: self.period,
        }
    }
}

/// Result of asking for a redraw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    /// A fetch is needed
    Started(HistoricalRequest),
    /// The same selection is already being fetched under this generation
    InFlight(u64),
    /// The panel already shows this selection
    Unchanged,
    /// No stock selected; the panel was torn down
    Cleared,
}

/// What `complete_redraw` did with a fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawOutcome {
    Rendered(Uuid),
    FetchFailed,
    RenderFailed,
    /// The request was superseded or the panel was torn down
    Discarded,
}

struct LiveChart {
    key: SelectionKey,
    handle: ChartHandle,
}

pub struct ChartController<R: ChartRenderer> {
    renderer: R,
    surface: Option<Surface>,
    live: Option<LiveChart>,
    pending: Option<HistoricalRequest>,
    generation: u64,
    panel: watch::Sender<PanelState>,
}

impl<R: ChartRenderer> ChartController<R> {
    pub fn new(renderer: R) -> Self {
        let (panel, _) = watch::channel(PanelState::default());
        Self {
            renderer,
            surface: None,
            live: None,
            pending: None,
            generation: 0,
            panel,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.panel.subscribe()
    }

    pub fn panel(&self) -> PanelState {
        self.panel.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn live_chart(&self) -> Option<&ChartHandle> {
        self.live.as_ref().map(|live| &live.handle)
    }

    pub fn pending(&self) -> Option<&HistoricalRequest> {
        self.pending.as_ref()
    }

    /// Bind the panel to a drawing surface. A different surface invalidates
    /// whatever was drawn on the old one.
    pub fn mount(&mut self, surface: Surface) {
        if self.surface.map(|s| s.id) == Some(surface.id) {
            return;
        }
        if self.surface.is_some() {
            self.teardown("surface replaced");
        }
        info!("🖼️ Chart panel mounted ({}x{})", surface.width, surface.height);
        self.surface = Some(surface);
    }

    /// Hide the panel: release the chart now and ignore in-flight fetches
    pub fn unmount(&mut self) {
        if self.surface.take().is_some() {
            info!("🖼️ Chart panel unmounted");
        }
        self.teardown("panel hidden");
    }

    /// Start drawing `selection` unless it is already shown or in flight
    pub fn request_redraw(&mut self, selection: &Selection) -> Result<Redraw, ViewerError> {
        let Some(key) = selection.key() else {
            self.teardown("selection cleared");
            return Ok(Redraw::Cleared);
        };

        if self.surface.is_none() {
            return Err(ViewerError::SurfaceUnavailable);
        }

        if let Some(pending) = &self.pending {
            if pending.key() == key {
                return Ok(Redraw::InFlight(pending.generation));
            }
        }

        if self.live.as_ref().map(|live| &live.key) == Some(&key) {
            // back to what is on screen; whatever was in flight or failed since is obsolete
            if self.pending.take().is_some() {
                self.generation += 1;
            }
            let generation = self.generation;
            self.panel.send_if_modified(|state| {
                let changed = state.generation != generation || state.loading || state.error.is_some();
                state.generation = generation;
                state.loading = false;
                state.error = None;
                changed
            });
            debug!("Chart for {} already shown", key);
            return Ok(Redraw::Unchanged);
        }

        self.generation += 1;
        let request = HistoricalRequest {
            generation: self.generation,
            symbol: key.symbol,
            period: key.period,
        };
        debug!(
            "📈 Redraw #{} requested for {} ({})",
            request.generation, request.symbol, request.period
        );
        self.pending = Some(request.clone());

        let generation = self.generation;
        self.panel.send_modify(|state| {
            state.generation = generation;
            state.loading = true;
            state.error = None;
        });

        Ok(Redraw::Started(request))
    }

    /// Apply the fetch result for `request`. Stale requests are dropped.
    pub fn complete_redraw(
        &mut self,
        request: &HistoricalRequest,
        result: Result<HistoricalSeries, ViewerError>,
    ) -> RedrawOutcome {
        if request.generation != self.generation || self.pending.as_ref() != Some(request) {
            debug!(
                "Discarding stale response #{} for {} (current #{})",
                request.generation, request.symbol, self.generation
            );
            return RedrawOutcome::Discarded;
        }
        self.pending = None;

        let outcome = match result {
            Ok(series) => self.replace_chart(request, series),
            Err(e) => {
                warn!("Historical fetch #{} failed: {}", request.generation, e);
                self.publish_error(e.to_string());
                RedrawOutcome::FetchFailed
            }
        };

        self.panel.send_modify(|state| state.loading = false);
        outcome
    }

    fn replace_chart(&mut self, request: &HistoricalRequest, series: HistoricalSeries) -> RedrawOutcome {
        let Some(surface) = self.surface else {
            self.publish_error(ViewerError::SurfaceUnavailable.to_string());
            return RedrawOutcome::RenderFailed;
        };

        self.release_live();

        match self.renderer.create(&surface, &series, &request.symbol) {
            Ok(handle) => {
                let view = ChartView {
                    chart_id: handle.id(),
                    symbol: request.symbol.clone(),
                    period: request.period,
                    series,
                    image: handle.image().unwrap_or_default(),
                };
                let chart_id = handle.id();
                info!(
                    "📈 Chart {} drawn for {} ({}, {} points)",
                    chart_id,
                    request.symbol,
                    request.period,
                    view.series.len()
                );
                self.live = Some(LiveChart {
                    key: request.key(),
                    handle,
                });
                self.panel.send_modify(|state| {
                    state.error = None;
                    state.chart = Some(view);
                });
                RedrawOutcome::Rendered(chart_id)
            }
            Err(e) => {
                warn!("Chart render #{} failed: {}", request.generation, e);
                self.publish_error(e.to_string());
                RedrawOutcome::RenderFailed
            }
        }
    }

    fn release_live(&mut self) {
        if let Some(mut live) = self.live.take() {
            self.renderer.destroy(&mut live.handle);
            self.panel.send_modify(|state| state.chart = None);
        }
    }

    fn publish_error(&mut self, message: String) {
        self.panel.send_modify(|state| state.error = Some(message));
    }

    /// Release the chart and invalidate any pending fetch
    fn teardown(&mut self, reason: &str) {
        if self.live.is_none() && self.pending.is_none() {
            return;
        }
        debug!("Tearing down chart panel: {}", reason);
        self.release_live();
        self.pending = None;
        self.generation += 1;
        let generation = self.generation;
        self.panel.send_modify(|state| {
            state.generation = generation;
            state.loading = false;
            state.error = None;
            state.chart = None;
        });
    }
}

impl<R: ChartRenderer> Drop for ChartController<R> {
    fn drop(&mut self) {
        if let Some(mut live) = self.live.take() {
            self.renderer.destroy(&mut live.handle);
        }
    }
}
