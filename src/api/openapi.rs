use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::responses::*;
use crate::conversion::{ConversionRates, ConversionResult};
use crate::jobs::PriceJobStats;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BTC Converter API",
        description = "Periodically ingested BTC prices and BTC to USD/EUR conversion",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::health_check,
        handlers::get_latest_price,
        handlers::convert,
    ),
    components(
        schemas(
            ConvertRequest,
            LatestPriceResponse,
            LatestPriceEnvelope,
            ConversionEnvelope,
            ConversionResult,
            ConversionRates,
            HealthResponse,
            PriceJobStats,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Prices", description = "Stored BTC price endpoints"),
        (name = "Conversion", description = "BTC conversion endpoints"),
    )
)]
pub struct ApiDoc;
