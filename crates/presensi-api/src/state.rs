//! Application state wiring the engine, retry policy, and configuration.
//!
//! `AppState` pins the generic engine to the concrete Chromium adapter and
//! owns the run-serialization lock. Used by the CLI, the HTTP trigger, and
//! the cron trigger alike.

use std::path::Path;
use std::sync::Arc;

use presensi_core::workflow::{AttendanceEngine, EngineError, RetryPolicy, RunContext};
use presensi_infra::browser::ChromiumPortal;
use presensi_infra::{config, holidays};
use presensi_types::attendance::{ActionResult, RunReport};
use presensi_types::config::AppConfig;

/// The engine pinned to the Chromium portal adapter.
pub type ConcreteEngine = AttendanceEngine<ChromiumPortal>;

/// A run that exhausted its attempts, with the report describing it.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    pub report: RunReport,
    pub error: EngineError,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<ConcreteEngine>,
    pub retry: RetryPolicy,
    /// Serializes runs. The remote account is the one shared resource;
    /// overlapping triggers queue here instead of racing it.
    run_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Read configuration and the holiday calendar, wire the engine.
    pub async fn init() -> anyhow::Result<Self> {
        let app_config = config::load_from_env()?;
        let holiday_path = config::holiday_file_from_env();
        let calendar = holidays::load_calendar(holiday_path.as_deref().map(Path::new)).await?;

        let engine = AttendanceEngine::new(ChromiumPortal::new(), calendar);

        Ok(Self {
            config: Arc::new(app_config),
            engine: Arc::new(engine),
            retry: RetryPolicy::default(),
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Execute one supervised attendance run.
    ///
    /// The run context is built once -- all attempts agree on the run id and
    /// on what "today" is -- and each attempt is a fresh session.
    pub async fn run_attendance(&self, trigger: &'static str) -> Result<RunReport, RunFailure> {
        let _guard = self.run_lock.lock().await;

        let ctx = RunContext::from_config(&self.config);
        tracing::info!(run_id = %ctx.run_id, trigger, today = %ctx.today, "attendance run triggered");

        let result = self
            .retry
            .supervise("attendance run", |attempt| {
                tracing::debug!(run_id = %ctx.run_id, attempt, "starting attempt");
                self.engine.run(&ctx)
            })
            .await;

        match result {
            Ok(supervised) => Ok(RunReport {
                run_id: ctx.run_id,
                decision: Some(supervised.value.decision),
                action: supervised.value.action,
                attempts: supervised.attempts,
                message: supervised.value.message(),
            }),
            Err(error) => {
                let action = match &error {
                    EngineError::Unconfirmed { .. } => ActionResult::Unconfirmed,
                    _ => ActionResult::Failed,
                };
                Err(RunFailure {
                    report: RunReport {
                        run_id: ctx.run_id,
                        decision: None,
                        action,
                        attempts: self.retry.max_attempts,
                        message: error.to_string(),
                    },
                    error,
                })
            }
        }
    }
}
