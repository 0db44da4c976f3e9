//! Run failures mapped to HTTP responses.
//!
//! The trigger contract is small: a failed run is a 500 with an `{"error"}`
//! payload; the run report rides along for operators who want the detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::state::RunFailure;

/// A supervised run that exhausted its attempts, as an HTTP response.
#[derive(Debug)]
pub struct AppError(pub RunFailure);

impl From<RunFailure> for AppError {
    fn from(failure: RunFailure) -> Self {
        AppError(failure)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.0.error.to_string(),
            "report": self.0.report,
        });

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presensi_core::workflow::EngineError;
    use presensi_types::attendance::{ActionResult, RunReport};

    #[test]
    fn test_failed_run_maps_to_500_with_error_key() {
        let failure = RunFailure {
            report: RunReport {
                run_id: uuid::Uuid::now_v7(),
                decision: None,
                action: ActionResult::Failed,
                attempts: 3,
                message: "dashboard never appeared; authentication failed".to_string(),
            },
            error: EngineError::AuthenticationFailed,
        };
        let response = AppError(failure).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
