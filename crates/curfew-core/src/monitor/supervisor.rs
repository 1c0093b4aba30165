//! Restart supervision for the monitor.
//!
//! Each start builds a fresh monitor through the factory, so nothing from a
//! crashed run survives: the curfew phase and the sent set are re-derived from
//! the wall clock.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::CoreError;
use crate::storage::{RestartMode, SupervisorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Run once.
    Never,
    /// Restart after a failed run, at most `max_restarts` times.
    OnFailure { max_restarts: u32 },
    /// Restart after every run until shutdown.
    Always,
}

impl RestartPolicy {
    pub fn from_config(config: &SupervisorConfig) -> Self {
        match config.restart {
            RestartMode::Never => Self::Never,
            RestartMode::OnFailure => Self::OnFailure {
                max_restarts: config.max_restarts,
            },
            RestartMode::Always => Self::Always,
        }
    }

    fn should_restart(&self, failed: bool, failures: u32) -> bool {
        match *self {
            Self::Never => false,
            Self::OnFailure { max_restarts } => failed && failures <= max_restarts,
            Self::Always => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupervisorReport {
    pub starts: u32,
    pub failures: u32,
    pub last_error: Option<String>,
    /// Stopped because the policy ran out, not because of shutdown.
    pub gave_up: bool,
}

/// Run `factory` under `policy` until shutdown or the policy says stop.
///
/// The factory receives the 1-based start number and a shutdown receiver to
/// hand to the run it builds.
pub async fn supervise<F, Fut>(
    policy: RestartPolicy,
    backoff: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut factory: F,
) -> SupervisorReport
where
    F: FnMut(u32, watch::Receiver<bool>) -> Fut,
    Fut: Future<Output = Result<(), CoreError>>,
{
    let mut report = SupervisorReport::default();

    loop {
        if *shutdown.borrow() {
            break;
        }

        report.starts += 1;
        info!(start = report.starts, "starting monitor");
        let failed = match factory(report.starts, shutdown.clone()).await {
            Ok(()) => false,
            Err(e) => {
                report.failures += 1;
                error!(start = report.starts, error = %e, "monitor run failed");
                report.last_error = Some(e.to_string());
                true
            }
        };

        if *shutdown.borrow() {
            break;
        }
        if !policy.should_restart(failed, report.failures) {
            report.gave_up = failed;
            break;
        }

        warn!(backoff_ms = backoff.as_millis() as u64, "restarting monitor");
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(
        starts = report.starts,
        failures = report.failures,
        "supervisor finished"
    );
    report
}
