// Library Crate Root
// lib.rs

// main.rs imports through lib.rs like an external crate
pub mod api;
pub mod config;
pub mod conversion;
pub mod database;
pub mod ingestion;
pub mod jobs;
pub mod price_feed;
pub mod utils;

// pub use = re-export at crate root
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use conversion::{ConversionError, ConversionService};
pub use ingestion::PriceIngestor;
pub use jobs::{PriceUpdateJob, PriceUpdateScheduler};
pub use price_feed::{CoinGeckoFetcher, PriceFetcher};
