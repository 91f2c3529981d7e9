//! Outbound price feed
//!
//! A `PriceFetcher` performs exactly one retrieval attempt and returns a
//! validated `PriceQuote`. Retrying and persistence belong to the ingestor.

pub mod coingecko;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::utils::money::{is_valid_price, round_money};

pub use coingecko::CoinGeckoFetcher;

/// Validated BTC price pair, quantized to two fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    btc_usd: Decimal,
    btc_eur: Decimal,
}

impl PriceQuote {
    /// Quantize both prices and reject anything that could not be stored
    pub fn new(btc_usd: Decimal, btc_eur: Decimal) -> Result<Self, FetchError> {
        Ok(Self {
            btc_usd: validate_price("usd", btc_usd)?,
            btc_eur: validate_price("eur", btc_eur)?,
        })
    }

    pub fn btc_usd(&self) -> Decimal {
        self.btc_usd
    }

    pub fn btc_eur(&self) -> Decimal {
        self.btc_eur
    }
}

fn validate_price(currency: &str, value: Decimal) -> Result<Decimal, FetchError> {
    let rounded = round_money(value);
    if !is_valid_price(rounded) {
        return Err(FetchError::InvalidPrice {
            currency: currency.to_string(),
            value,
        });
    }
    Ok(rounded)
}

/// Errors from a single retrieval attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Price endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Missing field in response: {0}")]
    MissingField(String),

    #[error("Invalid {currency} price: {value}")]
    InvalidPrice { currency: String, value: Decimal },

    #[error("Invalid price endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// One network retrieval of the BTC/USD and BTC/EUR prices
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch(&self) -> Result<PriceQuote, FetchError>;

    /// Name of the upstream source, for logs
    fn name(&self) -> &str;
}
