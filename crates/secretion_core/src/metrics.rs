//! Run metrics for the secretion simulation.
//!
//! Provides structured logging and counters for monitoring the state
//! machines over a long run.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters updated by the driver from the task reports.
pub struct Metrics {
    tick_count: AtomicU64,
    phase_switches: AtomicU64,
    dockings: AtomicU64,
    releases: AtomicU64,
    secretions: AtomicU64,
    proximity_rebuilds: AtomicU64,
    start_time: Instant,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub phase_switches: u64,
    pub dockings: u64,
    pub releases: u64,
    pub secretions: u64,
    pub proximity_rebuilds: u64,
    pub elapsed_ms: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            phase_switches: AtomicU64::new(0),
            dockings: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            secretions: AtomicU64::new(0),
            proximity_rebuilds: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, open_channels: usize, docked: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        // Log at info level every 1000 ticks
        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                open_channels = open_channels,
                docked = docked,
                secretions = self.secretions.load(Ordering::Relaxed),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_phase_switch(&self) {
        self.phase_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_docking(&self, docked: usize, released: usize, rebuilt: bool) {
        self.dockings.fetch_add(docked as u64, Ordering::Relaxed);
        self.releases.fetch_add(released as u64, Ordering::Relaxed);
        if rebuilt {
            self.proximity_rebuilds.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_secretions(&self, count: usize) {
        self.secretions.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.tick_count.load(Ordering::Relaxed),
            phase_switches: self.phase_switches.load(Ordering::Relaxed),
            dockings: self.dockings.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            secretions: self.secretions.load(Ordering::Relaxed),
            proximity_rebuilds: self.proximity_rebuilds.load(Ordering::Relaxed),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
