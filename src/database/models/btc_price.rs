use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::price_feed::PriceQuote;

/// A single committed BTC price observation
///
/// Rows are append-only: nothing in this crate updates or deletes them
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::btc_prices)]
#[diesel(primary_key(id))]
pub struct BtcPrice {
    /// Auto-incrementing ID
    pub id: i64,

    /// BTC price in USD, two fractional digits
    pub btc_usd: Decimal,

    /// BTC price in EUR, two fractional digits
    pub btc_eur: Decimal,

    /// When the price was retrieved from the feed
    pub observed_at: DateTime<Utc>,

    /// When this record was inserted into the database
    pub recorded_at: DateTime<Utc>,
}

/// New observation for insertion; `recorded_at` is assigned by the database
#[derive(Debug, Clone, PartialEq, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::btc_prices)]
pub struct NewBtcPrice {
    pub btc_usd: Decimal,
    pub btc_eur: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl NewBtcPrice {
    pub fn new(btc_usd: Decimal, btc_eur: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            btc_usd,
            btc_eur,
            observed_at,
        }
    }

    /// Build an observation from a validated quote
    pub fn from_quote(quote: &PriceQuote, observed_at: DateTime<Utc>) -> Self {
        Self::new(quote.btc_usd(), quote.btc_eur(), observed_at)
    }
}
