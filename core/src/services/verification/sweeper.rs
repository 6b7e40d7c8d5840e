//! Background eviction of expired verification codes
//!
//! The sweeper runs on one dedicated Tokio task that wakes every
//! `interval`, removes every entry older than the TTL, and goes back to
//! sleep. Eviction does not depend on verification traffic, so codes that
//! are never presented still leave memory.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use hs_shared::utils::email::mask_email;

use crate::domain::entities::verification_code::CodeEntry;

use super::clock::Clock;
use super::store::CodeStore;

/// Result of a single sweep pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries inspected
    pub scanned: usize,
    /// Entries removed because they outlived the TTL
    pub evicted: usize,
    /// Entries left in place because they are stamped in the future
    pub skewed: usize,
    /// Entries whose inspection panicked; they stay until a later pass
    pub failed: usize,
}

/// Counters accumulated over the lifetime of a sweeper
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweeperStats {
    /// Passes that completed
    pub passes: u64,
    /// Passes that panicked and were skipped
    pub failed_passes: u64,
    /// Entries evicted across all passes
    pub evicted: u64,
    /// Entries whose inspection panicked across all passes
    pub failed_entries: u64,
}

#[derive(Default)]
struct SweeperCounters {
    passes: AtomicU64,
    failed_passes: AtomicU64,
    evicted: AtomicU64,
    failed_entries: AtomicU64,
}

/// State shared between the sweeper handle and its background task
struct SweepCore {
    store: Arc<CodeStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    counters: SweeperCounters,
}

impl SweepCore {
    fn sweep_once(&self) -> SweepReport {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut scanned = 0;
        let mut skewed = 0;
        let mut failed = 0;

        let evicted = self.store.evict_where(|entry| {
            scanned += 1;
            // A panic here must not unwind through the store's shard lock.
            match panic::catch_unwind(AssertUnwindSafe(|| judge_entry(entry, now, ttl))) {
                Ok(Verdict::Evict) => true,
                Ok(Verdict::Keep) => false,
                Ok(Verdict::Skewed) => {
                    skewed += 1;
                    false
                }
                Err(payload) => {
                    failed += 1;
                    error!(
                        reason = %panic_message(payload.as_ref()),
                        event = "otp_sweep_entry_failed",
                        "Failed to inspect verification code, keeping it for the next pass"
                    );
                    false
                }
            }
        });

        SweepReport {
            scanned,
            evicted,
            skewed,
            failed,
        }
    }

    /// Run one pass, containing any panic so the periodic task survives it
    ///
    /// Failures on a single entry are handled inside the pass; this catches
    /// the rest, such as the clock failing before any entry is inspected.
    fn run_pass(&self) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.sweep_once())) {
            Ok(report) => {
                self.counters.passes.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .evicted
                    .fetch_add(report.evicted as u64, Ordering::Relaxed);
                self.counters
                    .failed_entries
                    .fetch_add(report.failed as u64, Ordering::Relaxed);
                if report.evicted > 0 || report.skewed > 0 || report.failed > 0 {
                    info!(
                        scanned = report.scanned,
                        evicted = report.evicted,
                        skewed = report.skewed,
                        failed = report.failed,
                        "Verification code sweep completed"
                    );
                } else {
                    debug!(scanned = report.scanned, "Verification code sweep found nothing to evict");
                }
            }
            Err(payload) => {
                self.counters.failed_passes.fetch_add(1, Ordering::Relaxed);
                error!(
                    reason = %panic_message(payload.as_ref()),
                    "Verification code sweep failed, retrying on next tick"
                );
            }
        }
    }

    fn stats(&self) -> SweeperStats {
        SweeperStats {
            passes: self.counters.passes.load(Ordering::Relaxed),
            failed_passes: self.counters.failed_passes.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
            failed_entries: self.counters.failed_entries.load(Ordering::Relaxed),
        }
    }
}

enum Verdict {
    Evict,
    Keep,
    Skewed,
}

fn judge_entry(entry: &CodeEntry, now: DateTime<Utc>, ttl: Duration) -> Verdict {
    if entry.is_from_future(now) {
        warn!(
            identity = %mask_email(&entry.identity),
            issued_at = %entry.issued_at,
            event = "otp_clock_skew",
            "Verification code stamped in the future, leaving it in place"
        );
        return Verdict::Skewed;
    }

    if !entry.is_expired(now, ttl) {
        return Verdict::Keep;
    }
    debug!(
        identity = %mask_email(&entry.identity),
        event = "otp_swept",
        "Evicting expired verification code"
    );
    Verdict::Evict
}

struct RunningSweep {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Periodic evictor with an explicit start/stop lifecycle
///
/// Dropping a started sweeper without calling [`stop`](Sweeper::stop) drops
/// the shutdown sender, which also ends the background task.
pub struct Sweeper {
    core: Arc<SweepCore>,
    interval: Duration,
    shutdown_grace: Duration,
    running: Mutex<Option<RunningSweep>>,
}

impl Sweeper {
    pub fn new(
        store: Arc<CodeStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        interval: Duration,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            core: Arc::new(SweepCore {
                store,
                clock,
                ttl,
                counters: SweeperCounters::default(),
            }),
            interval,
            shutdown_grace,
            running: Mutex::new(None),
        }
    }

    /// Spawn the background task on the current Tokio runtime
    ///
    /// The first pass runs one interval after start. Returns `false` if the
    /// sweeper is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.lock_running();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            warn!("Verification code sweeper already running");
            return false;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sweep_loop(Arc::clone(&self.core), self.interval, shutdown_rx));
        *running = Some(RunningSweep { shutdown_tx, handle });
        true
    }

    /// Request cancellation and wait for the task to finish
    ///
    /// Waits at most the shutdown grace period for an in-flight pass, then
    /// aborts the task. Calling `stop` on a stopped sweeper does nothing.
    pub async fn stop(&self) {
        let Some(RunningSweep {
            shutdown_tx,
            mut handle,
        }) = self.lock_running().take()
        else {
            return;
        };

        let _ = shutdown_tx.send(true);
        match tokio::time::timeout(self.shutdown_grace, &mut handle).await {
            Ok(Ok(())) => debug!("Verification code sweeper stopped"),
            Ok(Err(e)) => warn!(error = %e, "Verification code sweeper ended abnormally"),
            Err(_) => {
                warn!(
                    grace_ms = self.shutdown_grace.as_millis() as u64,
                    "Verification code sweeper did not stop within grace period, aborting"
                );
                handle.abort();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Run one pass immediately on the calling thread
    pub fn sweep_once(&self) -> SweepReport {
        self.core.sweep_once()
    }

    pub fn stats(&self) -> SweeperStats {
        self.core.stats()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<RunningSweep>> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn sweep_loop(core: Arc<SweepCore>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        interval_secs = period.as_secs(),
        ttl_secs = core.ttl.as_secs(),
        "Verification code sweeper started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender means the owner is gone.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                core.run_pass();
            }
        }
    }

    let stats = core.stats();
    info!(
        passes = stats.passes,
        failed_passes = stats.failed_passes,
        evicted = stats.evicted,
        "Verification code sweeper shutting down"
    );
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
