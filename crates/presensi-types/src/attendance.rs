//! Attendance decision and result model.
//!
//! `AttendanceDecision` is derived once per run from the holiday calendar,
//! the off-today roster, and the attendance-log row; it is read-only after
//! computation. `ActionResult` is the externally observable outcome of the
//! final click.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the run proceeds to the attendance action or stops early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceDecision {
    /// Normal working day; perform the configured action.
    Proceed,
    /// Today is a holiday or weekend (static calendar or day-type column).
    SkipHoliday,
    /// Approved leave ("CT") recorded in the attendance log.
    SkipLeave,
    /// The current user appears in the off-today roster.
    SkipOffToday,
}

impl AttendanceDecision {
    /// Skip decisions are successful early terminations, never errors.
    pub fn is_skip(&self) -> bool {
        !matches!(self, AttendanceDecision::Proceed)
    }
}

impl fmt::Display for AttendanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceDecision::Proceed => write!(f, "proceed"),
            AttendanceDecision::SkipHoliday => write!(f, "skip_holiday"),
            AttendanceDecision::SkipLeave => write!(f, "skip_leave"),
            AttendanceDecision::SkipOffToday => write!(f, "skip_off_today"),
        }
    }
}

/// Outcome of the final attendance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    /// The confirmation toast appeared for the action taken.
    Confirmed,
    /// The click was issued but no confirmation appeared within the bound.
    Unconfirmed,
    /// No click occurred (skip decision, skip override, or no check-type).
    Skipped,
    /// The run failed before or during the action.
    Failed,
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Confirmed => write!(f, "confirmed"),
            ActionResult::Unconfirmed => write!(f, "unconfirmed"),
            ActionResult::Skipped => write!(f, "skipped"),
            ActionResult::Failed => write!(f, "failed"),
        }
    }
}

/// Summary of one supervised run, serialized into trigger responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Time-sortable run identifier.
    pub run_id: Uuid,
    /// The computed skip/proceed decision, if the run got that far.
    pub decision: Option<AttendanceDecision>,
    /// The action outcome.
    pub action: ActionResult,
    /// How many attempts the retry supervisor used.
    pub attempts: u32,
    /// Human-readable outcome line.
    pub message: String,
}
