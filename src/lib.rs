//! # Fuse Exporter
//!
//! Polls Rari Fuse lending pools on a fixed cadence and republishes supply, borrow, interest
//! rate, liquidation, leverage, reserve and staking figures as Prometheus gauges.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod otlp;
pub mod scheduler;
pub mod serde;
pub mod source;
pub mod spawn;
pub mod status;
pub mod types;
pub mod units;
pub mod version;
