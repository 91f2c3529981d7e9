//! Retrying ingestion of the BTC price into the price store

pub mod ingestor;
pub mod retry;

pub use ingestor::{IngestError, PriceIngestor};
pub use retry::RetryPolicy;
