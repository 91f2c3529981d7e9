/// Repository pattern for the price store
///
/// Callers depend on the `PriceRepository` trait; the Diesel implementation
/// is wired in `main`, the in-memory one backs the unit tests.
pub mod price_repository;

#[cfg(test)]
pub mod memory;

pub use price_repository::{PriceRepository, PriceRepositoryImpl};
