/// Database module for the PostgreSQL price store
///
/// This module provides:
/// - Connection pooling with per-connection statement timeouts
/// - Embedded migrations for the `btc_prices` table
/// - Repository trait and Diesel implementation
pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, run_migrations, DatabaseError, DatabasePool};
pub use models::{BtcPrice, NewBtcPrice};
pub use repositories::{PriceRepository, PriceRepositoryImpl};
