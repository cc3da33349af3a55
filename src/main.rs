//! # Fuse Exporter
//!
//! Exports Rari Fuse pool metrics for Prometheus.

use clap::Parser;
use fuse_exporter::{
    cli::Args,
    otlp::{OtelConfig, OtelGuard},
};
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, prelude::*};

fn init_tracing_subscriber() -> eyre::Result<Option<OtelGuard>> {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer().with_filter(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        ),
    );

    if let Some(cfg) = OtelConfig::load() {
        let guard = cfg.provider()?;
        registry.with(guard.layer()).init();
        Ok(Some(guard))
    } else {
        registry.init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() {
    // Enable backtraces unless a RUST_BACKTRACE value has already been explicitly provided.
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let _guard = match init_tracing_subscriber() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    };
    if _guard.is_some() {
        debug!("opentelemetry initialized");
    }

    let args = Args::parse();
    if let Err(err) = args.run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
