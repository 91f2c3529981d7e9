use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{FetchError, PriceFetcher, PriceQuote};
use crate::config::PriceFeedConfig;

/// CoinGecko asset id for Bitcoin
pub const ASSET_ID: &str = "bitcoin";

/// Quote currencies requested from the feed
pub const QUOTE_CURRENCIES: [&str; 2] = ["usd", "eur"];

/// CoinGecko-backed price fetcher.
/// Fetches BTC spot prices in USD and EUR via `/simple/price`.
pub struct CoinGeckoFetcher {
    client: Client,
    base_url: Url,
}

impl CoinGeckoFetcher {
    pub fn new(config: &PriceFeedConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidEndpoint(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("btc-converter-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PriceFetcher for CoinGeckoFetcher {
    async fn fetch(&self) -> Result<PriceQuote, FetchError> {
        let vs_currencies = QUOTE_CURRENCIES.join(",");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("ids", ASSET_ID), ("vs_currencies", vs_currencies.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        parse_simple_price(&body)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}

/// Parse a `/simple/price` body like `{"bitcoin": {"usd": 67234.12, "eur": 61890.5}}`
pub fn parse_simple_price(body: &[u8]) -> Result<PriceQuote, FetchError> {
    let parsed: HashMap<String, Value> =
        serde_json::from_slice(body).map_err(|e| FetchError::MalformedBody(e.to_string()))?;

    let prices = match parsed.get(ASSET_ID) {
        None | Some(Value::Null) => return Err(FetchError::MissingField(ASSET_ID.to_string())),
        Some(Value::Object(prices)) => prices,
        Some(other) => {
            return Err(FetchError::MalformedBody(format!(
                "{} is not an object: {}",
                ASSET_ID, other
            )))
        }
    };

    let [usd, eur] = QUOTE_CURRENCIES;
    PriceQuote::new(price_field(prices, usd)?, price_field(prices, eur)?)
}

fn price_field(prices: &Map<String, Value>, currency: &str) -> Result<Decimal, FetchError> {
    match prices.get(currency) {
        None | Some(Value::Null) => Err(FetchError::MissingField(format!("{}.{}", ASSET_ID, currency))),
        Some(Value::Number(number)) => {
            // Go through the textual form so no f64 arithmetic touches the price
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|e| FetchError::MalformedBody(format!("{}.{}: {}", ASSET_ID, currency, e)))
        }
        Some(other) => Err(FetchError::MalformedBody(format!(
            "{}.{} is not a number: {}",
            ASSET_ID, currency, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_parse_simple_price() {
        let quote = parse_simple_price(br#"{"bitcoin": {"usd": 67234.12, "eur": 61890.5}}"#).unwrap();
        assert_eq!(quote.btc_usd(), dec!(67234.12));
        assert_eq!(quote.btc_eur(), dec!(61890.50));
    }

    #[test]
    fn test_parse_integer_prices() {
        let quote = parse_simple_price(br#"{"bitcoin": {"usd": 50000, "eur": 46000}}"#).unwrap();
        assert_eq!(quote.btc_usd().to_string(), "50000.00");
        assert_eq!(quote.btc_eur().to_string(), "46000.00");
    }

    #[test]
    fn test_parse_missing_currency() {
        let result = parse_simple_price(br#"{"bitcoin": {"usd": 67234.12}}"#);
        assert!(matches!(result, Err(FetchError::MissingField(ref f)) if f == "bitcoin.eur"));
    }

    #[test]
    fn test_parse_null_currency() {
        let result = parse_simple_price(br#"{"bitcoin": {"usd": null, "eur": 61890.5}}"#);
        assert!(matches!(result, Err(FetchError::MissingField(_))));
    }

    #[test]
    fn test_parse_missing_asset() {
        let result = parse_simple_price(br#"{}"#);
        assert!(matches!(result, Err(FetchError::MissingField(ref f)) if f == "bitcoin"));
    }

    #[test]
    fn test_parse_ignores_unrelated_top_level_entries() {
        let quote = parse_simple_price(
            br#"{"status": "ok", "bitcoin": {"usd": 67234.12, "eur": 61890.5}}"#,
        )
        .unwrap();
        assert_eq!(quote.btc_usd(), dec!(67234.12));
    }

    #[test]
    fn test_parse_asset_entry_not_an_object() {
        let result = parse_simple_price(br#"{"bitcoin": 67234.12}"#);
        assert!(matches!(result, Err(FetchError::MalformedBody(ref m)) if m.starts_with("bitcoin is not an object")));
    }

    #[test]
    fn test_parse_non_numeric_price() {
        let result = parse_simple_price(br#"{"bitcoin": {"usd": "lots", "eur": 61890.5}}"#);
        assert!(matches!(result, Err(FetchError::MalformedBody(_))));
    }

    #[test]
    fn test_parse_garbage_body() {
        let result = parse_simple_price(b"<html>rate limited</html>");
        assert!(matches!(result, Err(FetchError::MalformedBody(_))));
    }

    #[test]
    fn test_parse_zero_price_rejected() {
        let result = parse_simple_price(br#"{"bitcoin": {"usd": 0, "eur": 61890.5}}"#);
        assert!(matches!(result, Err(FetchError::InvalidPrice { .. })));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = PriceFeedConfig {
            base_url: "not a url".to_string(),
            ..PriceFeedConfig::default()
        };
        assert!(matches!(
            CoinGeckoFetcher::new(&config),
            Err(FetchError::InvalidEndpoint(_))
        ));
    }

    /// Serve `router` on an ephemeral port and return its `/simple/price` URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/simple/price", addr)
    }

    fn fetcher_for(base_url: String, timeout_secs: u64) -> CoinGeckoFetcher {
        CoinGeckoFetcher::new(&PriceFeedConfig {
            base_url,
            request_timeout_secs: timeout_secs,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let router = Router::new().route(
            "/simple/price",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("ids").map(String::as_str) != Some("bitcoin")
                    || params.get("vs_currencies").map(String::as_str) != Some("usd,eur")
                {
                    return (StatusCode::BAD_REQUEST, Json(serde_json::json!({})));
                }
                (
                    StatusCode::OK,
                    Json(serde_json::json!({"bitcoin": {"usd": 50000.0, "eur": 46000.0}})),
                )
            }),
        );
        let fetcher = fetcher_for(serve(router).await, 5);

        let quote = fetcher.fetch().await.unwrap();

        assert_eq!(quote.btc_usd(), dec!(50000.00));
        assert_eq!(quote.btc_eur(), dec!(46000.00));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let fetcher = fetcher_for(serve(router).await, 5);

        let result = fetcher.fetch().await;

        assert!(matches!(result, Err(FetchError::Status(status)) if status == StatusCode::TOO_MANY_REQUESTS));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let fetcher = fetcher_for(serve(router).await, 1);

        let result = fetcher.fetch().await;

        assert!(matches!(result, Err(FetchError::Transport(ref e)) if e.is_timeout()));
    }
}
