//! CLI command definitions for the `presensi` binary.
//!
//! Uses clap derive macros. Two verbs: `run` for a one-shot supervised run
//! (exit code reflects the outcome), `serve` for the HTTP trigger server
//! with an optional cron schedule.

pub mod run;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Automate daily attendance on the Talenta portal.
#[derive(Parser)]
#[command(name = "presensi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the attendance workflow once and exit.
    ///
    /// Exit code 0 on success (including skip days), non-zero after the
    /// retry supervisor gives up.
    Run,

    /// Start the HTTP trigger server.
    Serve {
        /// Port to listen on; defaults to the PORT variable, then 8080.
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Also fire runs on a schedule, e.g. "weekdays at 08:30" or a
        /// cron expression.
        #[arg(long)]
        schedule: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
