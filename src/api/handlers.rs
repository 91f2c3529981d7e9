use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::conversion::{ConversionError, ConversionResult, ConversionService};
use crate::jobs::PriceUpdateJob;

use super::responses::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub conversion_service: Arc<ConversionService>,
    /// Present when the price scheduler is running
    pub price_job: Option<PriceUpdateJob>,
}

impl AppState {
    pub fn new(conversion_service: Arc<ConversionService>, price_job: Option<PriceUpdateJob>) -> Self {
        Self {
            conversion_service,
            price_job,
        }
    }
}

/// Convert ConversionError to HTTP response
impl IntoResponse for ConversionError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConversionError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            ConversionError::NoPriceData => StatusCode::NOT_FOUND,
            ConversionError::Storage(e) => {
                tracing::error!("Price store read failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ingestion: state.price_job.as_ref().map(PriceUpdateJob::stats),
    })
}

/// Get the most recent BTC prices
#[utoipa::path(
    get,
    path = "/api/prices/latest",
    tag = "Prices",
    responses(
        (status = 200, description = "Latest stored price", body = LatestPriceEnvelope),
        (status = 404, description = "No price data available", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_latest_price(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LatestPriceResponse>>, ConversionError> {
    let latest = state.conversion_service.latest_price().await?;
    Ok(Json(ApiResponse::ok(latest.into())))
}

/// Convert a BTC amount to USD and EUR
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "Conversion",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Converted amounts", body = ConversionEnvelope),
        (status = 400, description = "Missing, unparsable or non-positive amount", body = ErrorResponse),
        (status = 404, description = "No price data available", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ConversionResult>>, ConversionError> {
    let Json(request) = payload.map_err(|rejection| {
        ConversionError::InvalidAmount(format!("Invalid BTC amount: {}", rejection.body_text()))
    })?;

    let result = state.conversion_service.convert(request.btc_amount).await?;
    Ok(Json(ApiResponse::ok(result)))
}
