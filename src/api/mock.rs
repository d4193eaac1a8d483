use std::collections::HashSet;
use std::time::Duration;

use chrono::{Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::DataGateway;
use crate::models::{HistoricalSeries, Period, Stock};
use crate::utils::ViewerError;

/// Intraday session used for `today`, half-hour steps from the open
const INTRADAY_LABELS: [&str; 6] = ["9:30", "10:00", "10:30", "11:00", "11:30", "12:00"];
/// Intraday price shape, quoted against a 150.25 reference price
const INTRADAY_SHAPE: [f64; 6] = [150.25, 151.30, 149.80, 152.00, 151.50, 150.75];
const INTRADAY_REFERENCE: f64 = 150.25;

/// Largest relative move between two generated points
const MAX_STEP: f64 = 0.02;

/// Deterministic in-process gateway.
///
/// The same symbol and period always produce the same series for a given
/// anchor date, so charts are reproducible.
#[derive(Debug, Clone)]
pub struct MockGateway {
    stocks: Vec<Stock>,
    anchor: NaiveDate,
    latency: Duration,
    failing_symbols: HashSet<String>,
    fail_stocks: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            stocks: vec![
                Stock::new("AAPL", 150.25, 2.5),
                Stock::new("GOOGL", 2750.80, -1.2),
                Stock::new("MSFT", 310.15, 0.8),
            ],
            anchor: Utc::now().date_naive(),
            latency: Duration::ZERO,
            failing_symbols: HashSet::new(),
            fail_stocks: false,
        }
    }

    pub fn with_stocks(mut self, stocks: Vec<Stock>) -> Self {
        self.stocks = stocks;
        self
    }

    /// Last calendar day of generated series
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make historical fetches for `symbol` fail
    pub fn with_failing_symbol(mut self, symbol: &str) -> Self {
        self.failing_symbols.insert(symbol.to_uppercase());
        self
    }

    /// Make the stock list fetch fail
    pub fn with_failing_stocks(mut self) -> Self {
        self.fail_stocks = true;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Build the series for a stock without any latency or failure injection
    pub fn series_for(&self, stock: &Stock, period: Period) -> HistoricalSeries {
        match period {
            Period::Today => {
                let scale = stock.price / INTRADAY_REFERENCE;
                let prices = INTRADAY_SHAPE
                    .iter()
                    .map(|p| round_cents(p * scale))
                    .collect();
                let labels = INTRADAY_LABELS.iter().map(|l| l.to_string()).collect();
                HistoricalSeries::new(labels, prices)
            }
            Period::SevenDays => self.daily_series(stock, period, 7, 1),
            Period::ThirtyDays => self.daily_series(stock, period, 30, 1),
            Period::SixMonths => self.daily_series(stock, period, 26, 7),
            Period::Year => self.monthly_series(stock, period, 12),
        }
    }

    fn daily_series(&self, stock: &Stock, period: Period, points: usize, step_days: u64) -> HistoricalSeries {
        let labels = (0..points)
            .map(|i| {
                let days_back = (points - 1 - i) as u64 * step_days;
                let day = self
                    .anchor
                    .checked_sub_days(chrono::Days::new(days_back))
                    .unwrap_or(self.anchor);
                day.format("%b %d").to_string()
            })
            .collect();
        HistoricalSeries::new(labels, random_walk(stock, period, points))
    }

    fn monthly_series(&self, stock: &Stock, period: Period, points: usize) -> HistoricalSeries {
        let labels = (0..points)
            .map(|i| {
                let months_back = (points - 1 - i) as u32;
                let month = self
                    .anchor
                    .checked_sub_months(Months::new(months_back))
                    .unwrap_or(self.anchor);
                month.format("%b %Y").to_string()
            })
            .collect();
        HistoricalSeries::new(labels, random_walk(stock, period, points))
    }

    fn find(&self, symbol: &str) -> Option<&Stock> {
        self.stocks
            .iter()
            .find(|stock| stock.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl DataGateway for MockGateway {
    async fn fetch_stocks(&self) -> Result<Vec<Stock>, ViewerError> {
        self.simulate_latency().await;
        if self.fail_stocks {
            return Err(ViewerError::stocks("mock gateway configured to fail"));
        }
        debug!("📋 Mock gateway serving {} stocks", self.stocks.len());
        Ok(self.stocks.clone())
    }

    async fn fetch_historical(&self, symbol: &str, period: Period) -> Result<HistoricalSeries, ViewerError> {
        self.simulate_latency().await;
        if self.failing_symbols.contains(&symbol.to_uppercase()) {
            return Err(ViewerError::historical(symbol, "mock gateway configured to fail"));
        }
        let stock = self
            .find(symbol)
            .ok_or_else(|| ViewerError::historical(symbol, "symbol not covered"))?;
        Ok(self.series_for(stock, period))
    }
}

/// Walk backwards from the current price so the series ends at the quote
fn random_walk(stock: &Stock, period: Period, points: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed(&stock.symbol, period));
    let mut prices = vec![0.0; points];
    let mut price = stock.price;
    for slot in prices.iter_mut().rev() {
        *slot = round_cents(price);
        let step: f64 = rng.gen_range(-MAX_STEP..MAX_STEP);
        price = (price / (1.0 + step)).max(0.01);
    }
    prices
}

/// FNV-1a over symbol and period name
fn seed(symbol: &str, period: Period) -> u64 {
    symbol
        .bytes()
        .chain(period.as_str().bytes())
        .fold(0xcbf29ce484222325u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x100000001b3)
        })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
