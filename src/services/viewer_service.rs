//! The viewer task.
//!
//! One tokio task owns the watchlist, the selection and the chart panel and
//! processes commands, refresh ticks and fetch completions one at a time.
//! Fetches run in a `JoinSet` and report back into the same loop, so no
//! state is ever touched from two places at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info};

use super::chart_service::ChartRenderer;
use super::panel_service::{ChartController, HistoricalRequest, Redraw, RedrawOutcome};
use super::selection_service::SelectionState;
use super::watchlist_service::{RefreshSchedule, WatchlistStore};
use crate::api::DataGateway;
use crate::models::{HistoricalSeries, PanelState, Period, Selection, Stock, Surface, WatchlistState};
use crate::utils::ViewerError;

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, ViewerError>>;

enum ViewerCommand {
    Select {
        symbol: Option<String>,
        period: Option<Period>,
        reply: Reply<Option<u64>>,
    },
    SetPeriod {
        period: Period,
        reply: Reply<Option<u64>>,
    },
    ClearSelection {
        reply: Reply<()>,
    },
    ShowPanel {
        surface: Surface,
        reply: Reply<Option<u64>>,
    },
    HidePanel {
        reply: Reply<()>,
    },
    RefreshNow,
    Shutdown,
}

enum FetchOutcome {
    Stocks(Result<Vec<Stock>, ViewerError>),
    Historical(HistoricalRequest, Result<HistoricalSeries, ViewerError>),
}

/// Cloneable front door to a running viewer
#[derive(Clone)]
pub struct ViewerHandle {
    commands: mpsc::Sender<ViewerCommand>,
    panel: watch::Receiver<PanelState>,
    watchlist: watch::Receiver<WatchlistState>,
    selection: watch::Receiver<Selection>,
}

impl ViewerHandle {
    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> ViewerCommand) -> Result<T, ViewerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| ViewerError::ViewerClosed)?;
        response.await.map_err(|_| ViewerError::ViewerClosed)?
    }

    /// Change stock and/or period. Returns the redraw generation to wait on,
    /// `None` when nothing is being drawn.
    pub async fn select(&self, symbol: Option<&str>, period: Option<Period>) -> Result<Option<u64>, ViewerError> {
        let symbol = symbol.map(str::to_string);
        self.request(|reply| ViewerCommand::Select { symbol, period, reply })
            .await
    }

    pub async fn set_period(&self, period: Period) -> Result<Option<u64>, ViewerError> {
        self.request(|reply| ViewerCommand::SetPeriod { period, reply }).await
    }

    pub async fn clear_selection(&self) -> Result<(), ViewerError> {
        self.request(|reply| ViewerCommand::ClearSelection { reply }).await
    }

    /// Mount the chart panel on `surface` and draw the current selection
    pub async fn show_panel(&self, surface: Surface) -> Result<Option<u64>, ViewerError> {
        self.request(|reply| ViewerCommand::ShowPanel { surface, reply }).await
    }

    pub async fn hide_panel(&self) -> Result<(), ViewerError> {
        self.request(|reply| ViewerCommand::HidePanel { reply }).await
    }

    pub async fn refresh_now(&self) -> Result<(), ViewerError> {
        self.commands
            .send(ViewerCommand::RefreshNow)
            .await
            .map_err(|_| ViewerError::ViewerClosed)
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(ViewerCommand::Shutdown).await;
    }

    pub fn panel(&self) -> PanelState {
        self.panel.borrow().clone()
    }

    pub fn watchlist(&self) -> WatchlistState {
        self.watchlist.borrow().clone()
    }

    pub fn selection(&self) -> Selection {
        self.selection.borrow().clone()
    }

    pub fn watchlist_updates(&self) -> watch::Receiver<WatchlistState> {
        self.watchlist.clone()
    }

    /// Wait until the redraw `generation` has finished or been superseded
    pub async fn wait_for_panel(&self, generation: u64) -> Result<PanelState, ViewerError> {
        let mut panel = self.panel.clone();
        loop {
            {
                let state = panel.borrow_and_update();
                if state.settled_for(generation) {
                    return Ok(state.clone());
                }
            }
            panel.changed().await.map_err(|_| ViewerError::ViewerClosed)?;
        }
    }

    /// `wait_for_panel` with a deadline
    pub async fn wait_for_panel_timeout(&self, generation: u64, limit: Duration) -> Result<PanelState, ViewerError> {
        match tokio::time::timeout(limit, self.wait_for_panel(generation)).await {
            Ok(result) => result,
            Err(_) => {
                let selection = self.selection();
                Err(ViewerError::historical(
                    selection.symbol().unwrap_or_default(),
                    format!("no response after {} s", limit.as_secs()),
                ))
            }
        }
    }

    /// Wait until the first watchlist refresh has landed (success or error)
    pub async fn wait_for_watchlist(&self) -> Result<WatchlistState, ViewerError> {
        let mut watchlist = self.watchlist.clone();
        loop {
            {
                let state = watchlist.borrow_and_update();
                if state.refreshed_at.is_some() || state.error.is_some() {
                    return Ok(state.clone());
                }
            }
            watchlist.changed().await.map_err(|_| ViewerError::ViewerClosed)?;
        }
    }
}

pub struct Viewer<G: DataGateway, R: ChartRenderer> {
    gateway: Arc<G>,
    controller: ChartController<R>,
    watchlist: WatchlistStore,
    selection: SelectionState,
    schedule: RefreshSchedule,
    tasks: JoinSet<FetchOutcome>,
    refresh_task: Option<Id>,
    historical_tasks: HashMap<Id, HistoricalRequest>,
}

impl<G: DataGateway, R: ChartRenderer> Viewer<G, R> {
    pub fn new(gateway: G, renderer: R, refresh_interval: Duration) -> Self {
        Self {
            gateway: Arc::new(gateway),
            controller: ChartController::new(renderer),
            watchlist: WatchlistStore::new(),
            selection: SelectionState::new(),
            schedule: RefreshSchedule::new(refresh_interval),
            tasks: JoinSet::new(),
            refresh_task: None,
            historical_tasks: HashMap::new(),
        }
    }

    /// Start the viewer task. The watchlist refresh starts immediately.
    pub fn spawn(self) -> (ViewerHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = ViewerHandle {
            commands,
            panel: self.controller.subscribe(),
            watchlist: self.watchlist.subscribe(),
            selection: self.selection.subscribe(),
        };
        let join = tokio::spawn(self.run(rx));
        (handle, join)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<ViewerCommand>) {
        info!("🚀 Viewer started (refresh every {} s)", self.schedule.period().as_secs());
        self.schedule.start();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ViewerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = self.schedule.tick() => self.start_refresh(),
                Some(joined) = self.tasks.join_next_with_id(), if !self.tasks.is_empty() => {
                    self.handle_fetch(joined);
                }
            }
        }

        self.stop();
    }

    fn stop(&mut self) {
        self.schedule.stop();
        self.tasks.abort_all();
        self.historical_tasks.clear();
        self.refresh_task = None;
        self.controller.unmount();
        info!("🛑 Viewer stopped");
    }

    fn handle_command(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::Select { symbol, period, reply } => {
                let _ = reply.send(self.select(symbol.as_deref(), period));
            }
            ViewerCommand::SetPeriod { period, reply } => {
                self.selection.set_period(period);
                let _ = reply.send(self.sync_chart());
            }
            ViewerCommand::ClearSelection { reply } => {
                self.selection.clear_stock();
                let _ = reply.send(self.sync_chart().map(|_| ()));
            }
            ViewerCommand::ShowPanel { surface, reply } => {
                self.controller.mount(surface);
                let _ = reply.send(self.sync_chart());
            }
            ViewerCommand::HidePanel { reply } => {
                self.controller.unmount();
                let _ = reply.send(Ok(()));
            }
            ViewerCommand::RefreshNow => self.start_refresh(),
            ViewerCommand::Shutdown => {}
        }
    }

    fn select(&mut self, symbol: Option<&str>, period: Option<Period>) -> Result<Option<u64>, ViewerError> {
        // resolve before mutating so an unknown symbol changes nothing
        let stock = match symbol {
            Some(symbol) => Some(
                self.watchlist
                    .find(symbol)
                    .ok_or_else(|| ViewerError::UnknownStock(symbol.to_uppercase()))?,
            ),
            None => None,
        };

        if let Some(period) = period {
            self.selection.set_period(period);
        }
        if let Some(stock) = stock {
            self.selection.select_stock(stock);
        }

        self.sync_chart()
    }

    /// Bring the chart panel in line with the current selection
    fn sync_chart(&mut self) -> Result<Option<u64>, ViewerError> {
        let selection = self.selection.current();
        match self.controller.request_redraw(&selection) {
            Ok(Redraw::Started(request)) => {
                let generation = request.generation;
                self.spawn_historical(request);
                Ok(Some(generation))
            }
            Ok(Redraw::InFlight(generation)) => Ok(Some(generation)),
            Ok(Redraw::Unchanged) | Ok(Redraw::Cleared) => Ok(None),
            Err(ViewerError::SurfaceUnavailable) => {
                debug!("Chart panel hidden, selection will be drawn when shown");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn spawn_historical(&mut self, request: HistoricalRequest) {
        let gateway = Arc::clone(&self.gateway);
        let task_request = request.clone();
        let task = self.tasks.spawn(async move {
            let result = gateway.fetch_historical(&task_request.symbol, task_request.period).await;
            FetchOutcome::Historical(task_request, result)
        });
        self.historical_tasks.insert(task.id(), request);
    }

    fn start_refresh(&mut self) {
        if self.refresh_task.is_some() {
            debug!("Watchlist refresh already in flight, skipping tick");
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let task = self.tasks.spawn(async move { FetchOutcome::Stocks(gateway.fetch_stocks().await) });
        self.refresh_task = Some(task.id());
    }

    fn handle_fetch(&mut self, joined: Result<(Id, FetchOutcome), JoinError>) {
        let id = match &joined {
            Ok((id, _)) => *id,
            Err(e) => e.id(),
        };
        let historical = self.historical_tasks.remove(&id);
        if self.refresh_task == Some(id) {
            self.refresh_task = None;
        }

        match joined {
            Ok((_, FetchOutcome::Stocks(result))) => {
                if let Ok(stocks) = &result {
                    self.selection.refresh_stock(stocks);
                }
                self.watchlist.apply_refresh(result);
            }
            Ok((_, FetchOutcome::Historical(request, result))) => self.finish_redraw(&request, result),
            Err(e) if e.is_cancelled() => debug!("Fetch task cancelled"),
            Err(e) => {
                error!("Fetch task failed: {}", e);
                match historical {
                    Some(request) => {
                        let failure = ViewerError::historical(&request.symbol, "fetch task panicked");
                        self.finish_redraw(&request, Err(failure));
                    }
                    None => {
                        self.watchlist.apply_refresh(Err(ViewerError::stocks("fetch task panicked")));
                    }
                }
            }
        }
    }

    fn finish_redraw(&mut self, request: &HistoricalRequest, result: Result<HistoricalSeries, ViewerError>) {
        match self.controller.complete_redraw(request, result) {
            RedrawOutcome::Rendered(chart_id) => debug!("Chart {} is live", chart_id),
            RedrawOutcome::Discarded => debug!("Dropped stale response #{}", request.generation),
            RedrawOutcome::FetchFailed | RedrawOutcome::RenderFailed => {}
        }
    }
}
