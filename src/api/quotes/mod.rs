pub mod client;
pub mod models;

pub use client::QuotesClient;
pub use models::{ApiError, HistoryResponse, QuoteResponse};
