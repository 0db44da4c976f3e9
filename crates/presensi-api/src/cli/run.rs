//! The one-shot `presensi run` command.

use crate::state::AppState;

/// Run the workflow once under the retry supervisor and report the outcome.
///
/// A failed run returns an error so the process exits non-zero -- external
/// schedulers key off the exit code.
pub async fn execute(state: &AppState, json: bool, quiet: bool) -> anyhow::Result<()> {
    match state.run_attendance("cli").await {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if !quiet {
                println!();
                println!("  {} {}", console::style("✓").green(), report.message);
                println!(
                    "  {}",
                    console::style(format!(
                        "run {} finished after {} attempt(s)",
                        report.run_id, report.attempts
                    ))
                    .dim()
                );
            }
            Ok(())
        }
        Err(failure) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&failure.report)?);
            } else {
                eprintln!();
                eprintln!("  {} {}", console::style("✗").red(), failure.error);
            }
            Err(failure.error.into())
        }
    }
}
