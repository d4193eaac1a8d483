use serde::{Deserialize, Serialize};

use crate::models::{HistoricalSeries, Stock};

/// One entry of `GET /stocks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
}

impl TryFrom<QuoteResponse> for Stock {
    type Error = String;

    /// Prices must be finite and non-negative, changes finite
    fn try_from(quote: QuoteResponse) -> Result<Self, Self::Error> {
        if !quote.price.is_finite() || quote.price < 0.0 {
            return Err(format!("invalid price {} for {}", quote.price, quote.symbol));
        }
        if !quote.change.is_finite() {
            return Err(format!("invalid change {} for {}", quote.change, quote.symbol));
        }
        Ok(Stock::new(quote.symbol, quote.price, quote.change))
    }
}

/// Body of `GET /history/{symbol}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

impl From<HistoryResponse> for HistoricalSeries {
    fn from(history: HistoryResponse) -> Self {
        HistoricalSeries::new(history.labels, history.prices)
    }
}

/// Error response from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Error type for quote API operations
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 404 Not Found
    NotFound(String),
    /// 429 Too Many Requests
    RateLimited { retry_after: Option<u64> },
    /// 5xx Server Error
    ServerError(u16, String),
    /// Other HTTP errors
    HttpError(u16, String),
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::RateLimited { retry_after } => match retry_after {
                Some(secs) => write!(f, "Rate Limited. Retry after {} s", secs),
                None => write!(f, "Rate Limited"),
            },
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
