#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{oneshot, Notify};

use stock_viewer::models::{ChartHandle, HistoricalSeries, Period, Stock, Surface};
use stock_viewer::{ChartRenderer, DataGateway, ViewerError};

pub fn watchlist() -> Vec<Stock> {
    vec![
        Stock::new("AAPL", 150.25, 2.5),
        Stock::new("GOOGL", 2750.80, -1.2),
        Stock::new("MSFT", 310.15, 0.8),
    ]
}

pub fn intraday() -> HistoricalSeries {
    HistoricalSeries::new(
        vec!["9:30".to_string(), "10:00".to_string()],
        vec![150.25, 151.30],
    )
}

/// Let every runnable task finish. Under a paused clock the sleep only
/// completes once the runtime is idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[derive(Debug, Default)]
pub struct RenderLog {
    pub created: Vec<(String, HistoricalSeries)>,
    pub destroyed: usize,
    pub live: usize,
    pub max_live: usize,
}

/// Renderer that records every call and produces a tiny fake image
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<RenderLog>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.log.lock().unwrap().created.len()
    }

    pub fn destroys(&self) -> usize {
        self.log.lock().unwrap().destroyed
    }

    pub fn live(&self) -> usize {
        self.log.lock().unwrap().live
    }

    pub fn max_live(&self) -> usize {
        self.log.lock().unwrap().max_live
    }

    pub fn last_created(&self) -> Option<(String, HistoricalSeries)> {
        self.log.lock().unwrap().created.last().cloned()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn create(
        &mut self,
        surface: &Surface,
        series: &HistoricalSeries,
        label: &str,
    ) -> Result<ChartHandle, ViewerError> {
        series.validate()?;
        let mut log = self.log.lock().unwrap();
        log.created.push((label.to_string(), series.clone()));
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        Ok(ChartHandle::new(surface, label, series.clone(), vec![0x89, b'P', b'N', b'G']))
    }

    fn destroy(&mut self, handle: &mut ChartHandle) {
        if handle.release() {
            let mut log = self.log.lock().unwrap();
            log.live -= 1;
            log.destroyed += 1;
        }
    }
}

enum Scripted {
    Respond(Result<HistoricalSeries, ViewerError>),
    Panic,
}

struct PendingFetch {
    symbol: String,
    period: Period,
    reply: oneshot::Sender<Scripted>,
}

struct ScriptState {
    stocks: Mutex<Result<Vec<Stock>, ViewerError>>,
    stock_calls: AtomicUsize,
    historical_calls: AtomicUsize,
    pending: Mutex<Vec<PendingFetch>>,
    requested: Notify,
}

/// Gateway whose historical fetches stay open until the test resolves them.
/// Stock list fetches answer immediately with the scripted list.
#[derive(Clone)]
pub struct ScriptedGateway {
    state: Arc<ScriptState>,
}

impl ScriptedGateway {
    pub fn new(stocks: Vec<Stock>) -> Self {
        Self {
            state: Arc::new(ScriptState {
                stocks: Mutex::new(Ok(stocks)),
                stock_calls: AtomicUsize::new(0),
                historical_calls: AtomicUsize::new(0),
                pending: Mutex::new(Vec::new()),
                requested: Notify::new(),
            }),
        }
    }

    pub fn set_stocks(&self, stocks: Result<Vec<Stock>, ViewerError>) {
        *self.state.stocks.lock().unwrap() = stocks;
    }

    pub fn stock_calls(&self) -> usize {
        self.state.stock_calls.load(Ordering::SeqCst)
    }

    pub fn historical_calls(&self) -> usize {
        self.state.historical_calls.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> Vec<(String, Period)> {
        self.state
            .pending
            .lock()
            .unwrap()
            .iter()
            .map(|p| (p.symbol.clone(), p.period))
            .collect()
    }

    /// Wait until at least `count` historical fetches are open
    pub async fn wait_for_pending(&self, count: usize) {
        loop {
            let notified = self.state.requested.notified();
            if self.state.pending.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Answer the open fetch for `symbol`/`period`. Returns false if there is none.
    pub fn resolve(&self, symbol: &str, period: Period, result: Result<HistoricalSeries, ViewerError>) -> bool {
        self.answer(symbol, period, Scripted::Respond(result))
    }

    /// Make the open fetch for `symbol`/`period` panic inside the fetch task
    pub fn panic(&self, symbol: &str, period: Period) -> bool {
        self.answer(symbol, period, Scripted::Panic)
    }

    fn answer(&self, symbol: &str, period: Period, scripted: Scripted) -> bool {
        let mut pending = self.state.pending.lock().unwrap();
        let Some(index) = pending
            .iter()
            .position(|p| p.symbol == symbol && p.period == period)
        else {
            return false;
        };
        let fetch = pending.remove(index);
        fetch.reply.send(scripted).is_ok()
    }
}

impl DataGateway for ScriptedGateway {
    async fn fetch_stocks(&self) -> Result<Vec<Stock>, ViewerError> {
        self.state.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.state.stocks.lock().unwrap().clone()
    }

    async fn fetch_historical(&self, symbol: &str, period: Period) -> Result<HistoricalSeries, ViewerError> {
        self.state.historical_calls.fetch_add(1, Ordering::SeqCst);
        let (reply, response) = oneshot::channel();
        self.state.pending.lock().unwrap().push(PendingFetch {
            symbol: symbol.to_string(),
            period,
            reply,
        });
        self.state.requested.notify_waiters();
        match response.await {
            Ok(Scripted::Respond(result)) => result,
            Ok(Scripted::Panic) => panic!("scripted gateway failure for {}", symbol),
            Err(_) => Err(ViewerError::historical(symbol, "request dropped")),
        }
    }
}
