use std::fmt;
use thiserror::Error;

/// Which fetch a `ViewerError::FetchFailed` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchContext {
    Stocks,
    Historical,
}

impl fmt::Display for FetchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchContext::Stocks => write!(f, "stock data"),
            FetchContext::Historical => write!(f, "historical data"),
        }
    }
}

/// Every failure the viewer can surface. None of them are fatal: each one
/// ends up as an inline message next to the watchlist or the chart panel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("Failed to fetch {context}{}: {reason}", symbol_suffix(.symbol))]
    FetchFailed {
        context: FetchContext,
        symbol: Option<String>,
        reason: String,
    },

    #[error("Chart panel is not visible")]
    SurfaceUnavailable,

    #[error("Failed to render chart: {reason}")]
    RenderFailed { reason: String },

    #[error("Unknown stock '{0}'")]
    UnknownStock(String),

    #[error("Unknown period '{0}'. Supported: today, 7days, 30days, 6months, year")]
    InvalidPeriod(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Viewer is not running")]
    ViewerClosed,
}

fn symbol_suffix(symbol: &Option<String>) -> String {
    match symbol {
        Some(symbol) => format!(" for {}", symbol),
        None => String::new(),
    }
}

impl ViewerError {
    pub fn stocks(reason: impl Into<String>) -> Self {
        ViewerError::FetchFailed {
            context: FetchContext::Stocks,
            symbol: None,
            reason: reason.into(),
        }
    }

    pub fn historical(symbol: &str, reason: impl Into<String>) -> Self {
        ViewerError::FetchFailed {
            context: FetchContext::Historical,
            symbol: Some(symbol.to_string()),
            reason: reason.into(),
        }
    }

    pub fn render(reason: impl Into<String>) -> Self {
        ViewerError::RenderFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_message_names_symbol() {
        let err = ViewerError::historical("MSFT", "timeout");
        assert_eq!(err.to_string(), "Failed to fetch historical data for MSFT: timeout");
    }

    #[test]
    fn test_stocks_message_has_no_symbol() {
        let err = ViewerError::stocks("connection refused");
        assert_eq!(err.to_string(), "Failed to fetch stock data: connection refused");
    }
}
