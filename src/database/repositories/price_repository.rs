use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{BtcPrice, NewBtcPrice};
use crate::database::schema::btc_prices;
use diesel::prelude::*;
use std::sync::Arc;

/// Price repository trait - append-only store of BTC price observations
///
/// Methods are blocking; async callers go through `spawn_blocking`
pub trait PriceRepository: Send + Sync {
    /// Insert one observation inside a transaction and return the committed row
    fn insert(&self, new_price: NewBtcPrice) -> Result<BtcPrice, DatabaseError>;

    /// Most recent observation by `observed_at`, ties broken by `id`
    fn get_latest(&self) -> Result<Option<BtcPrice>, DatabaseError>;

    /// Number of committed observations
    fn count(&self) -> Result<i64, DatabaseError>;
}

/// Diesel implementation of PriceRepository
pub struct PriceRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl PriceRepositoryImpl {
    /// Create new price repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl PriceRepository for PriceRepositoryImpl {
    fn insert(&self, new_price: NewBtcPrice) -> Result<BtcPrice, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        // Rolled back on any error, so readers never see a partial row
        conn.transaction::<_, DatabaseError, _>(|conn| {
            let inserted = diesel::insert_into(btc_prices::table)
                .values(&new_price)
                .returning(BtcPrice::as_returning())
                .get_result::<BtcPrice>(conn)?;

            Ok(inserted)
        })
    }

    fn get_latest(&self) -> Result<Option<BtcPrice>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        btc_prices::table
            .select(BtcPrice::as_select())
            .order((btc_prices::observed_at.desc(), btc_prices::id.desc()))
            .first::<BtcPrice>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        btc_prices::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
