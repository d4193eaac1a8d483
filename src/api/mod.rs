//! Data gateway: where quotes and historical series come from

use std::future::Future;

use crate::config::{GatewayKind, ViewerConfig};
use crate::models::{HistoricalSeries, Period, Stock};
use crate::utils::ViewerError;

pub mod mock;
pub mod quotes;

pub use mock::MockGateway;
pub use quotes::QuotesClient;

/// Single-shot request/response access to market data.
///
/// Both calls resolve exactly once. Errors are already `FetchFailed` so the
/// viewer can display them as-is.
pub trait DataGateway: Send + Sync + 'static {
    fn fetch_stocks(&self) -> impl Future<Output = Result<Vec<Stock>, ViewerError>> + Send;

    fn fetch_historical(
        &self,
        symbol: &str,
        period: Period,
    ) -> impl Future<Output = Result<HistoricalSeries, ViewerError>> + Send;
}

/// Gateway selected at startup from configuration
pub enum Gateway {
    Mock(MockGateway),
    Http(QuotesClient),
}

impl Gateway {
    pub fn from_config(config: &ViewerConfig) -> Self {
        match &config.gateway {
            GatewayKind::Mock => Gateway::Mock(MockGateway::new().with_latency(config.mock_latency)),
            GatewayKind::Http { base_url } => {
                let client = QuotesClient::new(base_url.clone());
                match &config.gateway_token {
                    Some(token) => Gateway::Http(client.with_token(token.clone())),
                    None => Gateway::Http(client),
                }
            }
        }
    }
}

impl DataGateway for Gateway {
    async fn fetch_stocks(&self) -> Result<Vec<Stock>, ViewerError> {
        match self {
            Gateway::Mock(gateway) => gateway.fetch_stocks().await,
            Gateway::Http(client) => client.fetch_stocks().await,
        }
    }

    async fn fetch_historical(&self, symbol: &str, period: Period) -> Result<HistoricalSeries, ViewerError> {
        match self {
            Gateway::Mock(gateway) => gateway.fetch_historical(symbol, period).await,
            Gateway::Http(client) => client.fetch_historical(symbol, period).await,
        }
    }
}
