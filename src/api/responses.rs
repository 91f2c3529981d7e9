use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::conversion::ConversionResult;
use crate::database::models::BtcPrice;
use crate::jobs::PriceJobStats;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Serialize, ToSchema)]
#[aliases(LatestPriceEnvelope = ApiResponse<LatestPriceResponse>, ConversionEnvelope = ApiResponse<ConversionResult>)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error envelope: `{"success": false, "error": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[schema(example = "No price data available")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Request to convert a BTC amount
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Amount of BTC; a JSON number or numeric string. `amount` is accepted as an alias.
    #[serde(default, alias = "amount")]
    #[schema(value_type = String, example = "0.01")]
    pub btc_amount: Decimal,
}

/// Latest stored BTC price
#[derive(Debug, Serialize, ToSchema)]
pub struct LatestPriceResponse {
    pub id: i64,
    #[schema(value_type = String, example = "67234.12")]
    pub btc_usd: Decimal,
    #[schema(value_type = String, example = "61890.50")]
    pub btc_eur: Decimal,
    /// When the price was observed at the feed
    pub timestamp: DateTime<Utc>,
}

impl From<BtcPrice> for LatestPriceResponse {
    fn from(price: BtcPrice) -> Self {
        Self {
            id: price.id,
            btc_usd: price.btc_usd,
            btc_eur: price.btc_eur,
            timestamp: price.observed_at,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Absent when the price scheduler failed to start
    pub ingestion: Option<PriceJobStats>,
}
