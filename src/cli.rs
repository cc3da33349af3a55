//! # Fuse exporter CLI
use crate::{
    config::{EventMode, ExporterConfig},
    constants::DEFAULT_PORT,
    scheduler::Task,
    spawn::try_spawn_with_args,
};
use alloy::primitives::Address;
use clap::Parser;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};
use url::Url;

/// Exports Rari Fuse pool metrics for Prometheus.
#[derive(Debug, Parser)]
#[command(author, about = "Fuse exporter", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be used and stored in the working directory under
    /// `exporter.yaml`.
    #[arg(
        long,
        value_name = "CONFIG",
        env = "FUSE_EXPORTER_CONFIG",
        default_value = "exporter.yaml"
    )]
    pub config: PathBuf,
    /// The address to serve `/metrics` and `/status` on.
    #[arg(
        long = "http.addr",
        value_name = "ADDR",
        default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST)
    )]
    pub address: IpAddr,
    /// The port to serve `/metrics` and `/status` on.
    #[arg(long = "http.port", value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// The Ethereum JSON-RPC endpoint to read the Fuse contracts from.
    ///
    /// Must be a valid HTTP or HTTPS URL.
    #[arg(long = "endpoint", value_name = "RPC_ENDPOINT", env = "FUSE_EXPORTER_ENDPOINT")]
    pub endpoint: Option<Url>,
    /// The address of the `FusePoolLens` contract.
    #[arg(long = "lens", value_name = "ADDRESS")]
    pub lens: Option<Address>,
    /// The base URL of the RSS scoring API.
    #[arg(long = "rss-url", value_name = "URL", env = "FUSE_EXPORTER_RSS_URL")]
    pub rss_url: Option<Url>,
    /// A constant ETH price in USD, used instead of CoinGecko. For testing only.
    #[arg(long = "constant-eth-usd", value_name = "USD")]
    pub constant_eth_usd: Option<f64>,
    /// Time between two refresh cycles.
    #[arg(long = "interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub interval: Option<Duration>,
    /// Delay after which a due task is marked as run.
    #[arg(long = "confirm-delay", value_name = "MILLIS", value_parser = parse_duration_millis)]
    pub confirm_delay: Option<Duration>,
    /// Minimum time between two RSS score refreshes.
    #[arg(long = "score-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub score_interval: Option<Duration>,
    /// Minimum time between two CToken event scans.
    #[arg(long = "events-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub events_interval: Option<Duration>,
    /// Minimum time between two reserves and fees refreshes.
    #[arg(long = "reserves-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub reserves_interval: Option<Duration>,
    /// Minimum time between two leverage scans.
    #[arg(long = "leverage-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub leverage_interval: Option<Duration>,
    /// Minimum time between two staking refreshes.
    #[arg(long = "staking-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub staking_interval: Option<Duration>,
    /// A pool excluded from every refresh cycle. Replaces the configured skip-list.
    #[arg(long = "skip-pool", value_name = "ID")]
    pub skipped_pools: Option<Vec<u64>>,
    /// Which CToken events are counted.
    #[arg(long = "events", value_name = "MODE", value_enum)]
    pub event_mode: Option<EventMode>,
    /// Ignores borrowers with less than 0.1 ETH of debt when classifying leverage.
    #[arg(long = "dust-filter", default_value_t = false)]
    pub dust_filter: bool,
}

impl Args {
    /// Run the exporter.
    pub async fn run(self) -> eyre::Result<()> {
        let config_path = self.config.clone();
        try_spawn_with_args(self, &config_path).await?.server.stopped().await;

        Ok(())
    }

    /// Merges [`Args`] values into an existing [`ExporterConfig`] instance.
    pub fn merge_exporter_config(self, config: ExporterConfig) -> ExporterConfig {
        let mut config = config
            .with_address(self.address)
            .with_port(self.port)
            .with_endpoint(self.endpoint)
            .with_lens(self.lens)
            .with_rss_url(self.rss_url)
            .with_constant_eth_usd(self.constant_eth_usd)
            .with_interval(self.interval)
            .with_confirm_delay(self.confirm_delay)
            .with_event_mode(self.event_mode)
            .with_dust_filter(self.dust_filter);

        for (task, interval) in [
            (Task::Score, self.score_interval),
            (Task::Events, self.events_interval),
            (Task::Reserves, self.reserves_interval),
            (Task::Leverage, self.leverage_interval),
            (Task::Staking, self.staking_interval),
        ] {
            if let Some(interval) = interval {
                config = config.with_task_interval(task, interval);
            }
        }

        if let Some(pools) = self.skipped_pools {
            config = config.with_skipped_pools(pools);
        }

        config
    }
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, String> {
    let seconds: u64 = arg.parse().map_err(|err| format!("{err}"))?;
    if seconds == 0 {
        return Err("must be at least one second".into());
    }
    Ok(Duration::from_secs(seconds))
}

/// Parses a string representing milliseconds to a [`Duration`].
fn parse_duration_millis(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let millis = arg.parse()?;
    Ok(Duration::from_millis(millis))
}
