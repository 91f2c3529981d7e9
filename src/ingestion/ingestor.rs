use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::time::sleep;

use super::RetryPolicy;
use crate::database::models::{BtcPrice, NewBtcPrice};
use crate::database::repositories::PriceRepository;
use crate::database::DatabaseError;
use crate::price_feed::{FetchError, PriceFetcher};

/// Why a single fetch-and-store attempt failed
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] DatabaseError),
}

/// Fetches the current BTC price and commits it, retrying within a bounded budget
pub struct PriceIngestor {
    fetcher: Arc<dyn PriceFetcher>,
    repository: Arc<dyn PriceRepository>,
    retry_policy: RetryPolicy,
}

impl PriceIngestor {
    pub fn new(
        fetcher: Arc<dyn PriceFetcher>,
        repository: Arc<dyn PriceRepository>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            repository,
            retry_policy,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Run one ingestion: returns true when a new observation was committed
    ///
    /// Never commits more than one row and never makes more than
    /// `max_attempts` network calls. Errors are logged, not returned.
    pub async fn ingest_once(&self) -> bool {
        let max_attempts = self.retry_policy.attempts();

        for attempt in 1..=max_attempts {
            match self.try_ingest().await {
                Ok(price) => {
                    tracing::info!(
                        "✅ Price updated: BTC/USD=${}, BTC/EUR=€{} (id={}, attempt {}/{})",
                        price.btc_usd,
                        price.btc_eur,
                        price.id,
                        attempt,
                        max_attempts
                    );
                    return true;
                }
                Err(e) if self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay_for(attempt);
                    tracing::warn!(
                        "❌ Price ingestion failed from {} (attempt {}/{}): {}. Retrying in {:?}",
                        self.fetcher.name(),
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Price ingestion failed from {} (attempt {}/{}): {}. Giving up this cycle",
                        self.fetcher.name(),
                        attempt,
                        max_attempts,
                        e
                    );
                }
            }
        }

        false
    }

    /// One fetch followed by one transactional insert
    async fn try_ingest(&self) -> Result<BtcPrice, IngestError> {
        let quote = self.fetcher.fetch().await?;
        let new_price = NewBtcPrice::from_quote(&quote, Utc::now());

        // Diesel is blocking; keep it off the async workers
        let repository = Arc::clone(&self.repository);
        let stored = tokio::task::spawn_blocking(move || repository.insert(new_price))
            .await
            .map_err(|e| DatabaseError::TaskFailed(e.to_string()))??;

        Ok(stored)
    }
}
