//! Poller background daemon.
//!
//! Runs the poll cycle on a fixed interval until asked to stop:
//! - One cycle immediately on startup
//! - Cycles never overlap; the interval is measured from the end of a cycle
//! - A panic inside a cycle is logged and the loop carries on

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{Notify, RwLock};
use tokio::time::Instant;

use crate::domain::models::ScheduleConfig;
use crate::services::poll_cycle::{CycleReport, PollCycle};

/// Configuration for the poller daemon.
#[derive(Debug, Clone)]
pub struct PollerDaemonConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
}

impl Default for PollerDaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30 * 60),
        }
    }
}

impl PollerDaemonConfig {
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn from_schedule(schedule: &ScheduleConfig) -> Self {
        let seconds = schedule.poll_interval_minutes.saturating_mul(60);
        Self::with_interval(Duration::from_secs(seconds))
    }
}

/// Status of the poller daemon.
#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    pub running: bool,
    pub total_cycles: u64,
    /// Cycles that panicked and were abandoned.
    pub panicked_cycles: u64,
    pub last_run: Option<Instant>,
    pub last_report: Option<CycleReport>,
}

/// Handle to control the poller daemon.
#[derive(Clone)]
pub struct DaemonHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<DaemonStatus>>,
}

impl DaemonHandle {
    /// Request the daemon to stop. A cycle in flight runs to completion.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }
}

/// Poller background daemon.
pub struct PollerDaemon {
    cycle: PollCycle,
    config: PollerDaemonConfig,
    status: Arc<RwLock<DaemonStatus>>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl PollerDaemon {
    pub fn new(cycle: PollCycle, config: PollerDaemonConfig) -> Self {
        Self {
            cycle,
            config,
            status: Arc::new(RwLock::new(DaemonStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Get a handle to control the daemon.
    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop_flag: self.stop_flag.clone(),
            wake: self.wake.clone(),
            status: self.status.clone(),
        }
    }

    /// Run cycles until [`DaemonHandle::stop`] is called. Returns the final status.
    pub async fn run(mut self) -> DaemonStatus {
        self.status.write().await.running = true;
        tracing::info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "poller daemon started"
        );

        loop {
            if self.stop_requested() {
                break;
            }

            self.run_once().await;

            if self.stop_requested() {
                break;
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.poll_interval) => {}
                () = self.wake.notified() => {}
            }
        }

        let mut status = self.status.write().await;
        status.running = false;
        tracing::info!(total_cycles = status.total_cycles, "poller daemon stopped");
        status.clone()
    }

    /// Run a single cycle, containing any panic. `None` when the cycle panicked.
    pub async fn run_once(&mut self) -> Option<CycleReport> {
        let result = AssertUnwindSafe(self.cycle.run_cycle()).catch_unwind().await;

        let mut status = self.status.write().await;
        status.total_cycles += 1;
        status.last_run = Some(Instant::now());

        match result {
            Ok(report) => {
                status.last_report = Some(report.clone());
                Some(report)
            }
            Err(payload) => {
                status.panicked_cycles += 1;
                tracing::error!(
                    panic = %panic_message(payload.as_ref()),
                    "poll cycle panicked, continuing with next cycle"
                );
                None
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
