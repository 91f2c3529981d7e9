//! BTC to USD/EUR conversion using the latest stored price
//!
//! Amounts are computed in fixed-point `Decimal` and rounded to two fractional
//! digits with ties away from zero.

pub mod errors;
pub mod service;

pub use errors::ConversionError;
pub use service::{ConversionRates, ConversionResult, ConversionService};
