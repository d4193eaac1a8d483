use serde::{Deserialize, Serialize};

/// A single watchlist entry as supplied by the data gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub price: f64,
    /// Signed percent change
    pub change: f64,
}

/// Direction of the change indicator shown next to a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }

    /// Embed color: green for up, red for down
    pub fn color(&self) -> u32 {
        match self {
            Trend::Up => 0x22c55e,
            Trend::Down => 0xef4444,
        }
    }
}

impl Stock {
    pub fn new(symbol: impl Into<String>, price: f64, change: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
        }
    }

    /// Zero change counts as up
    pub fn trend(&self) -> Trend {
        if self.change >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    /// `$150.25`
    pub fn price_display(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// `▲ 2.5%` / `▼ 1.2%`
    pub fn change_display(&self) -> String {
        format!("{} {}%", self.trend().arrow(), self.change.abs())
    }
}
