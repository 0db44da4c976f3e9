//! Presensi CLI and HTTP trigger entry point.
//!
//! Binary name: `presensi`
//!
//! Parses CLI arguments, builds the immutable configuration and the engine,
//! then either runs the workflow once or starts the trigger server.

mod cli;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use clap_complete::generate;

use presensi_core::workflow::scheduler::{RunCallback, RunScheduler};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,presensi=debug",
        _ => "trace",
    };
    presensi_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "presensi", &mut std::io::stdout());
        return Ok(());
    }

    // Configuration and calendar load once, before any session opens
    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Run => cli::run::execute(&state, cli.json, cli.quiet).await,

        Commands::Serve {
            port,
            host,
            schedule,
        } => serve(state, port, host, schedule).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    presensi_observe::tracing_setup::shutdown_tracing();
    result
}

/// Bind the trigger server, optionally with a cron schedule alongside it.
async fn serve(
    state: AppState,
    port: Option<u16>,
    host: String,
    schedule: Option<String>,
) -> anyhow::Result<()> {
    let port = port.unwrap_or(state.config.port);

    let scheduler = match &schedule {
        Some(expr) => {
            let scheduled_state = state.clone();
            let callback: RunCallback = Arc::new(move || {
                let state = scheduled_state.clone();
                Box::pin(async move {
                    match state.run_attendance("cron").await {
                        Ok(report) => tracing::info!(
                            run_id = %report.run_id,
                            action = %report.action,
                            "scheduled run finished"
                        ),
                        Err(failure) => tracing::error!(
                            run_id = %failure.report.run_id,
                            error = %failure.error,
                            "scheduled run failed"
                        ),
                    }
                })
            });
            Some(RunScheduler::start(expr, callback).await?)
        }
        None => None,
    };

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Presensi trigger listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    if let Some(scheduler) = &scheduler {
        println!(
            "  {} schedule: {}",
            console::style("⏰").bold(),
            console::style(scheduler.cron_expr()).cyan()
        );
    }
    println!(
        "  {}",
        console::style("POST / to trigger a run; Ctrl+C to stop").dim()
    );

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await?;
    }
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
