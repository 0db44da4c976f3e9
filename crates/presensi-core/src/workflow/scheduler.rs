//! Cron trigger wrapping `tokio-cron-scheduler` for timed attendance runs.
//!
//! The service usually runs behind an external scheduler (CI cron, systemd
//! timer) hitting the HTTP trigger, but it can also keep its own schedule:
//! `serve --schedule "weekdays at 08:30"` registers one job that fires a
//! supervised run.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio_cron_scheduler::{Job, JobScheduler};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur while registering or running the schedule.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Failed to create, add, or start the cron job.
    #[error("scheduler error: {0}")]
    JobError(String),

    /// Unrecognized cron expression or schedule phrase.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

// ---------------------------------------------------------------------------
// Schedule normalization
// ---------------------------------------------------------------------------

/// Normalize a schedule string to a 6-field cron expression (with seconds).
///
/// Accepted forms:
/// - 6-field cron, returned as-is
/// - 5-field cron, "0" prepended for the seconds field
/// - "daily at HH:MM" / "every day at HH:MM"  -> "0 MM HH * * *"
/// - "weekdays at HH:MM"                      -> "0 MM HH * * Mon-Fri"
///
/// Attendance is weekday-shaped, so the weekday phrase is the one most
/// deployments want.
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let trimmed = input.trim();

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() == 6 {
        return Ok(trimmed.to_string());
    }
    if parts.len() == 5 {
        return Ok(format!("0 {trimmed}"));
    }

    let lower = trimmed.to_lowercase();
    let phrase = lower.strip_prefix("every day at ")
        .or_else(|| lower.strip_prefix("daily at "))
        .map(|at| (at, "*"))
        .or_else(|| lower.strip_prefix("weekdays at ").map(|at| (at, "Mon-Fri")));

    if let Some((at, days)) = phrase {
        let (hour, minute) = parse_hh_mm(at)
            .ok_or_else(|| SchedulerError::InvalidSchedule(input.to_string()))?;
        return Ok(format!("0 {minute} {hour} * * {days}"));
    }

    Err(SchedulerError::InvalidSchedule(format!(
        "unrecognized schedule format: '{trimmed}'"
    )))
}

fn parse_hh_mm(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.trim().split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

// ---------------------------------------------------------------------------
// RunScheduler
// ---------------------------------------------------------------------------

/// Callback fired on every schedule tick.
pub type RunCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Owns the single registered attendance job.
pub struct RunScheduler {
    inner: JobScheduler,
    cron_expr: String,
}

impl RunScheduler {
    /// Normalize the schedule, register the job, and start ticking.
    pub async fn start(schedule: &str, callback: RunCallback) -> Result<Self, SchedulerError> {
        let cron_expr = normalize_schedule(schedule)?;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        let job = Job::new_async(cron_expr.as_str(), move |_job_id, _lock| {
            let callback = Arc::clone(&callback);
            Box::pin(async move {
                callback().await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;
        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        tracing::info!(cron = %cron_expr, "attendance schedule registered");
        Ok(Self {
            inner: scheduler,
            cron_expr,
        })
    }

    /// The normalized cron expression in effect.
    pub fn cron_expr(&self) -> &str {
        &self.cron_expr
    }

    /// Stop ticking and drop all jobs.
    pub async fn shutdown(mut self) -> Result<(), SchedulerError> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
