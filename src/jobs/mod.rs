/// Scheduled background jobs
///
/// - Price update: fetches and stores the BTC price on a fixed interval
pub mod price_update_job;

pub use price_update_job::{
    CycleOutcome, PriceJobStats, PriceUpdateJob, PriceUpdateScheduler, SchedulerError,
};
