use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::errors::ConversionError;
use crate::database::models::BtcPrice;
use crate::database::repositories::PriceRepository;
use crate::database::DatabaseError;
use crate::utils::money::round_money;

/// Rates used for a conversion
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConversionRates {
    #[schema(value_type = String, example = "50000.00")]
    pub btc_usd: Decimal,
    #[schema(value_type = String, example = "46000.00")]
    pub btc_eur: Decimal,
}

/// Result of converting a BTC amount with the latest stored price
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConversionResult {
    #[schema(value_type = String, example = "0.01")]
    pub btc_amount: Decimal,
    #[schema(value_type = String, example = "500.00")]
    pub usd_amount: Decimal,
    #[schema(value_type = String, example = "460.00")]
    pub eur_amount: Decimal,
    pub rates: ConversionRates,
    /// When the price used was observed; callers judge staleness from this
    pub timestamp: DateTime<Utc>,
}

impl ConversionResult {
    /// Convert `btc_amount` at `price`, rounding each amount independently
    pub fn from_observation(btc_amount: Decimal, price: &BtcPrice) -> Result<Self, ConversionError> {
        Ok(Self {
            btc_amount,
            usd_amount: convert_amount(btc_amount, price.btc_usd)?,
            eur_amount: convert_amount(btc_amount, price.btc_eur)?,
            rates: ConversionRates {
                btc_usd: price.btc_usd,
                btc_eur: price.btc_eur,
            },
            timestamp: price.observed_at,
        })
    }
}

fn convert_amount(btc_amount: Decimal, rate: Decimal) -> Result<Decimal, ConversionError> {
    btc_amount
        .checked_mul(rate)
        .map(round_money)
        .ok_or_else(|| ConversionError::InvalidAmount("BTC amount too large".to_string()))
}

/// Read side of the price store: latest observation and conversions
pub struct ConversionService {
    repository: Arc<dyn PriceRepository>,
}

impl ConversionService {
    pub fn new(repository: Arc<dyn PriceRepository>) -> Self {
        Self { repository }
    }

    /// Most recent committed observation
    pub async fn latest_price(&self) -> Result<BtcPrice, ConversionError> {
        let repository = Arc::clone(&self.repository);

        tokio::task::spawn_blocking(move || repository.get_latest())
            .await
            .map_err(|e| DatabaseError::TaskFailed(e.to_string()))??
            .ok_or(ConversionError::NoPriceData)
    }

    /// Convert a positive BTC amount to USD and EUR
    pub async fn convert(&self, btc_amount: Decimal) -> Result<ConversionResult, ConversionError> {
        if btc_amount <= Decimal::ZERO {
            return Err(ConversionError::InvalidAmount(
                "BTC amount must be greater than 0".to_string(),
            ));
        }

        let latest = self.latest_price().await?;
        ConversionResult::from_observation(btc_amount, &latest)
    }
}
