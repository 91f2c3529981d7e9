use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use utoipa::ToSchema;

use crate::ingestion::PriceIngestor;

/// Scheduler lifecycle errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// What happened to one triggered cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new observation was committed
    Committed,
    /// Every attempt failed; the store is unchanged
    NoNewData,
    /// Another cycle was still running
    Skipped,
}

/// Snapshot of ingestion cycle statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceJobStats {
    pub runs: u64,
    pub successes: u64,
    pub failures: u64,
    pub skipped: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct JobCounters {
    runs: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
    last_run_at: RwLock<Option<DateTime<Utc>>>,
    last_success_at: RwLock<Option<DateTime<Utc>>>,
}

/// One guarded ingestion cycle
///
/// The cycle guard serializes writers: a trigger that fires while a cycle is
/// still in flight is skipped instead of running concurrently.
#[derive(Clone)]
pub struct PriceUpdateJob {
    ingestor: Arc<PriceIngestor>,
    cycle_guard: Arc<Mutex<()>>,
    counters: Arc<JobCounters>,
}

impl PriceUpdateJob {
    pub fn new(ingestor: Arc<PriceIngestor>) -> Self {
        Self {
            ingestor,
            cycle_guard: Arc::new(Mutex::new(())),
            counters: Arc::new(JobCounters::default()),
        }
    }

    /// Run one ingestion cycle unless another one is in flight
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("⏭️  Price update still running, skipping this trigger");
            return CycleOutcome::Skipped;
        };

        let started = std::time::Instant::now();
        self.counters.runs.fetch_add(1, Ordering::Relaxed);
        *self.counters.last_run_at.write() = Some(Utc::now());

        if self.ingestor.ingest_once().await {
            self.counters.successes.fetch_add(1, Ordering::Relaxed);
            *self.counters.last_success_at.write() = Some(Utc::now());
            tracing::debug!("Price update cycle completed in {:?}", started.elapsed());
            CycleOutcome::Committed
        } else {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "⚠️  Price update cycle stored no new data after {:?}",
                started.elapsed()
            );
            CycleOutcome::NoNewData
        }
    }

    /// Wait until no cycle is in flight; new cycles are skipped while the guard is held
    pub async fn wait_idle(&self) -> MutexGuard<'_, ()> {
        self.cycle_guard.lock().await
    }

    pub fn stats(&self) -> PriceJobStats {
        PriceJobStats {
            runs: self.counters.runs.load(Ordering::Relaxed),
            successes: self.counters.successes.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            last_run_at: *self.counters.last_run_at.read(),
            last_success_at: *self.counters.last_success_at.read(),
        }
    }
}

/// Owns the background schedule driving `PriceUpdateJob`
pub struct PriceUpdateScheduler {
    scheduler: JobScheduler,
    job: PriceUpdateJob,
    interval: Duration,
}

impl PriceUpdateScheduler {
    /// Run the warm-up cycle, then trigger the job every `interval`
    ///
    /// A failed warm-up is logged and never prevents the schedule from starting.
    pub async fn start(job: PriceUpdateJob, interval: Duration) -> Result<Self, SchedulerError> {
        tracing::info!("Fetching initial BTC prices...");
        match job.run_cycle().await {
            CycleOutcome::Committed => tracing::info!("✅ Initial BTC price stored"),
            outcome => {
                tracing::warn!("⚠️  Initial price fetch failed ({:?})", outcome);
                tracing::warn!("   Will retry in scheduled interval");
            }
        }

        let scheduler = JobScheduler::new().await?;

        let scheduled = job.clone();
        let repeated = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let job = scheduled.clone();

            Box::pin(async move {
                tracing::debug!("🕐 Price update job triggered");
                job.run_cycle().await;
            })
        })?;

        scheduler.add(repeated).await?;
        scheduler.start().await?;

        tracing::info!(
            "✅ Price scheduler started (updates every {} seconds)",
            interval.as_secs()
        );

        Ok(Self {
            scheduler,
            job,
            interval,
        })
    }

    pub fn job(&self) -> &PriceUpdateJob {
        &self.job
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop triggering new cycles and let an in-flight one finish its commit
    pub async fn shutdown(mut self) -> Result<(), SchedulerError> {
        tracing::info!("Stopping price scheduler...");
        self.scheduler.shutdown().await?;

        let _idle = self.job.wait_idle().await;
        tracing::info!("Price scheduler stopped");

        Ok(())
    }
}
