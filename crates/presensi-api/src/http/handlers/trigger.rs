//! The run trigger: one POST, one supervised attendance run.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use presensi_types::attendance::RunReport;

use crate::http::error::AppError;
use crate::state::AppState;

/// Success payload: a human-readable message plus the full run report.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub message: String,
    pub report: RunReport,
}

/// POST /trigger -- run the workflow once (request body is ignored).
///
/// Skip outcomes are successes: a holiday short-circuit still returns 200.
/// Only an exhausted retry supervisor produces a 500.
pub async fn trigger_run(State(state): State<AppState>) -> Result<Json<TriggerResponse>, AppError> {
    let report = state.run_attendance("http").await?;
    Ok(Json(TriggerResponse {
        message: report.message.clone(),
        report,
    }))
}
