//! Error types for conversion requests

use thiserror::Error;

use crate::database::DatabaseError;

/// Errors that can occur while serving a conversion or latest-price read
///
/// # Error Categories
///
/// - **Validation Errors**: `InvalidAmount`
/// - **State Errors**: `NoPriceData`
/// - **Internal Errors**: `Storage`
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Quantity is missing, unparsable, non-positive or too large to convert
    #[error("{0}")]
    InvalidAmount(String),

    /// No observation has ever been committed
    #[error("No price data available")]
    NoPriceData,

    /// The price store could not be read
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}
