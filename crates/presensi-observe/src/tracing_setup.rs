//! Tracing subscriber initialization.
//!
//! Installs a structured `fmt` layer and, optionally, an OpenTelemetry
//! bridge with a stdout exporter (swap for OTLP in production). The caller
//! supplies a default filter directive -- typically derived from CLI
//! verbosity flags -- which `RUST_LOG` overrides when set.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Kept so the OTel pipeline can be flushed on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize the global tracing subscriber.
///
/// `default_filter` is a filter directive like `"info,presensi=debug"`; a
/// set `RUST_LOG` takes priority over it. With `enable_otel`, spans are
/// additionally exported through OpenTelemetry.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(
    default_filter: &str,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("presensi");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .init();
    } else {
        registry.init();
    }

    Ok(())
}

/// Flush buffered spans and shut down the OTel provider.
///
/// No-op when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
