use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, ErrorResponse, HistoryResponse, QuoteResponse};
use crate::api::DataGateway;
use crate::models::{HistoricalSeries, Period, Stock};
use crate::utils::ViewerError;

/// JSON quote service client
///
/// Endpoints:
/// * `GET {base}/stocks` - list of `{symbol, price, change}`
/// * `GET {base}/history/{symbol}?period={period}` - `{labels, prices}`
#[derive(Debug, Clone)]
pub struct QuotesClient {
    http_client: HttpClient,
    api_token: Option<String>,
    base_url: String,
}

impl QuotesClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token: None,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, api_token: String) -> Self {
        self.api_token = Some(api_token);
        self
    }

    pub fn stocks_url(&self) -> String {
        format!("{}/stocks", self.base_url)
    }

    pub fn history_url(&self, symbol: &str, period: Period) -> String {
        format!("{}/history/{}?period={}", self.base_url, symbol.to_uppercase(), period.as_str())
    }

    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.api_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::RequestError(format!("Failed to create auth header: {}", e)))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body_text) {
            Ok(ErrorResponse { message: Some(message), .. }) => message,
            Ok(ErrorResponse { error: Some(error), .. }) => error,
            _ => body_text,
        };

        match status_code {
            400 => ApiError::BadRequest(message),
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Quote API rate limited, retry after {:?} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Quote API server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /stocks
    pub async fn get_quotes(&self) -> Result<Vec<QuoteResponse>, ApiError> {
        self.get_json(&self.stocks_url()).await
    }

    /// GET /history/{symbol}?period={period}
    pub async fn get_history(&self, symbol: &str, period: Period) -> Result<HistoryResponse, ApiError> {
        self.get_json(&self.history_url(symbol, period)).await
    }
}

impl DataGateway for QuotesClient {
    async fn fetch_stocks(&self) -> Result<Vec<Stock>, ViewerError> {
        let quotes = self
            .get_quotes()
            .await
            .map_err(|e| ViewerError::stocks(e.to_string()))?;
        stocks_from_quotes(quotes)
    }

    async fn fetch_historical(&self, symbol: &str, period: Period) -> Result<HistoricalSeries, ViewerError> {
        let history = self
            .get_history(symbol, period)
            .await
            .map_err(|e| ViewerError::historical(symbol, e.to_string()))?;
        Ok(HistoricalSeries::from(history))
    }
}

/// Convert a quote list, rejecting the whole list if any entry is malformed
fn stocks_from_quotes(quotes: Vec<QuoteResponse>) -> Result<Vec<Stock>, ViewerError> {
    quotes
        .into_iter()
        .map(Stock::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| {
            warn!("Rejected quote list: {}", reason);
            ViewerError::stocks(reason)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = QuotesClient::new("http://localhost:8080/api/".to_string());
        assert_eq!(client.stocks_url(), "http://localhost:8080/api/stocks");
        assert_eq!(
            client.history_url("msft", Period::SixMonths),
            "http://localhost:8080/api/history/MSFT?period=6months"
        );
    }

    #[test]
    fn test_token_header() {
        let client = QuotesClient::new("http://localhost".to_string()).with_token("abc".to_string());
        let headers = client.create_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    fn quote(symbol: &str, price: f64, change: f64) -> QuoteResponse {
        QuoteResponse {
            symbol: symbol.to_string(),
            price,
            change,
        }
    }

    #[test]
    fn test_valid_quotes_convert() {
        let stocks = stocks_from_quotes(vec![quote("AAPL", 150.25, 2.5), quote("GOOGL", 2750.80, -1.2)]).unwrap();
        assert_eq!(stocks[0], Stock::new("AAPL", 150.25, 2.5));
        assert_eq!(stocks[1].change, -1.2);
    }

    #[test]
    fn test_negative_or_non_finite_price_rejects_list() {
        let err = stocks_from_quotes(vec![quote("AAPL", 150.25, 2.5), quote("BAD", -3.0, 0.0)]).unwrap_err();
        assert_eq!(err, ViewerError::stocks("invalid price -3 for BAD"));

        assert!(stocks_from_quotes(vec![quote("NAN", f64::NAN, 0.0)]).is_err());
        assert!(stocks_from_quotes(vec![quote("INF", 10.0, f64::INFINITY)]).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_failure() {
        let client = QuotesClient::new("http://127.0.0.1:9".to_string());
        let err = client.fetch_historical("AAPL", Period::Today).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch historical data for AAPL"));
    }
}
