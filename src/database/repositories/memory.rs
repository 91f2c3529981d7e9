//! In-memory PriceRepository used by unit tests across the crate

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use super::PriceRepository;
use crate::database::connection::DatabaseError;
use crate::database::models::{BtcPrice, NewBtcPrice};

#[derive(Default)]
pub struct InMemoryPriceRepository {
    rows: Mutex<Vec<BtcPrice>>,
    next_id: AtomicI64,
    failing_inserts: AtomicUsize,
    failing_reads: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl InMemoryPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` inserts fail as a rolled-back transaction would
    pub fn fail_next_inserts(&self, count: usize) {
        self.failing_inserts.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` reads fail
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<BtcPrice> {
        self.rows.lock().clone()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl PriceRepository for InMemoryPriceRepository {
    fn insert(&self, new_price: NewBtcPrice) -> Result<BtcPrice, DatabaseError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if Self::take_failure(&self.failing_inserts) {
            return Err(DatabaseError::QueryError("connection reset".to_string()));
        }

        // Mirrors the CHECK constraints on btc_prices
        if new_price.btc_usd <= Decimal::ZERO || new_price.btc_eur <= Decimal::ZERO {
            return Err(DatabaseError::QueryError(
                "check constraint violation".to_string(),
            ));
        }

        let row = BtcPrice {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            btc_usd: new_price.btc_usd,
            btc_eur: new_price.btc_eur,
            observed_at: new_price.observed_at,
            recorded_at: Utc::now(),
        };

        self.rows.lock().push(row.clone());
        Ok(row)
    }

    fn get_latest(&self) -> Result<Option<BtcPrice>, DatabaseError> {
        if Self::take_failure(&self.failing_reads) {
            return Err(DatabaseError::ConnectionPoolError("timed out".to_string()));
        }

        Ok(self
            .rows
            .lock()
            .iter()
            .max_by_key(|row| (row.observed_at, row.id))
            .cloned())
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.rows.lock().len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_latest_orders_by_observed_at_then_id() {
        let repository = InMemoryPriceRepository::new();
        let t0 = Utc::now();

        repository
            .insert(NewBtcPrice::new(dec!(3.00), dec!(3.00), t0 + Duration::seconds(10)))
            .unwrap();
        repository
            .insert(NewBtcPrice::new(dec!(1.00), dec!(1.00), t0))
            .unwrap();
        let tie = repository
            .insert(NewBtcPrice::new(dec!(4.00), dec!(4.00), t0 + Duration::seconds(10)))
            .unwrap();

        let latest = repository.get_latest().unwrap().unwrap();
        assert_eq!(latest.id, tie.id);
        assert_eq!(latest.btc_usd, dec!(4.00));
    }

    #[test]
    fn test_injected_failure_leaves_no_row() {
        let repository = InMemoryPriceRepository::new();
        repository.fail_next_inserts(1);

        let result = repository.insert(NewBtcPrice::new(dec!(1.00), dec!(1.00), Utc::now()));

        assert!(result.is_err());
        assert_eq!(repository.count().unwrap(), 0);
        assert!(repository
            .insert(NewBtcPrice::new(dec!(1.00), dec!(1.00), Utc::now()))
            .is_ok());
    }
}
