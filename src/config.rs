//! Exporter configuration.
use crate::{
    constants::{
        AT_RISK_HEALTH, COINGECKO_API_URL, DEFAULT_CONFIRM_DELAY, DEFAULT_CYCLE_INTERVAL,
        DEFAULT_PORT, DUST_BORROW, EVENTS_START_BLOCK, FUSE_POOL_LENS, LIQUIDATABLE_HEALTH,
        RSS_API_URL, SKIPPED_POOLS,
    },
    scheduler::Task,
};
use alloy::primitives::{Address, U256};
use clap::ValueEnum;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::Path,
    time::Duration,
};
use url::Url;

/// Exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream endpoints and contracts.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Refresh scheduling.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// CToken event scanning.
    #[serde(default)]
    pub events: EventsConfig,
    /// User leverage classification.
    #[serde(default)]
    pub leverage: LeverageConfig,
    /// Staking position tracking. Disabled when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking: Option<StakingConfig>,
}

impl ExporterConfig {
    /// Sets the IP address to serve on.
    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.server.address = address;
        self
    }

    /// Sets the port to serve on.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Sets the RPC endpoint, if any.
    pub fn with_endpoint(mut self, endpoint: Option<Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.upstream.endpoint = endpoint;
        }
        self
    }

    /// Sets the lens address, if any.
    pub fn with_lens(mut self, lens: Option<Address>) -> Self {
        if let Some(lens) = lens {
            self.upstream.lens = lens;
        }
        self
    }

    /// Sets the RSS API base URL, if any.
    pub fn with_rss_url(mut self, rss_url: Option<Url>) -> Self {
        if let Some(rss_url) = rss_url {
            self.upstream.rss_url = rss_url;
        }
        self
    }

    /// Sets a constant ETH/USD price. Used for testing.
    pub fn with_constant_eth_usd(mut self, price: Option<f64>) -> Self {
        self.upstream.constant_eth_usd = price.or(self.upstream.constant_eth_usd);
        self
    }

    /// Sets the time between two refresh cycles, if any.
    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        if let Some(interval) = interval {
            self.scheduler.interval = interval;
        }
        self
    }

    /// Sets the delay after which cadence decisions are committed, if any.
    pub fn with_confirm_delay(mut self, delay: Option<Duration>) -> Self {
        if let Some(delay) = delay {
            self.scheduler.confirm_delay = delay;
        }
        self
    }

    /// Sets the interval of a single task.
    pub fn with_task_interval(mut self, task: Task, interval: Duration) -> Self {
        *self.scheduler.tasks.interval_mut(task) = interval;
        self
    }

    /// Sets the pools excluded from every cycle.
    pub fn with_skipped_pools(mut self, pools: Vec<u64>) -> Self {
        self.scheduler.skipped_pools = pools;
        self
    }

    /// Sets the event scan mode, if any.
    pub fn with_event_mode(mut self, mode: Option<EventMode>) -> Self {
        if let Some(mode) = mode {
            self.events.mode = mode;
        }
        self
    }

    /// Enables the dust filter on leverage classification.
    pub fn with_dust_filter(mut self, enabled: bool) -> Self {
        if enabled && self.leverage.dust_threshold.is_none() {
            self.leverage.dust_threshold = Some(DUST_BORROW);
        }
        self
    }

    /// Sets the staking position to track.
    pub fn with_staking(mut self, staking: Option<StakingConfig>) -> Self {
        self.staking = staking.or(self.staking);
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Checks that every interval is non-zero.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.scheduler.interval.is_zero() {
            eyre::bail!("scheduler.interval must be at least one second");
        }
        for task in Task::ALL {
            if self.scheduler.tasks.interval(task).is_zero() {
                eyre::bail!("interval of {task} must be at least one second");
            }
        }
        Ok(())
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address to serve `/metrics` and `/status` on.
    pub address: IpAddr,
    /// The port to serve `/metrics` and `/status` on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: DEFAULT_PORT }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Ethereum JSON-RPC endpoint.
    pub endpoint: Url,
    /// The `FusePoolLens` contract.
    pub lens: Address,
    /// Base URL of the RSS scoring API.
    pub rss_url: Url,
    /// Base URL of the CoinGecko API.
    pub coingecko_url: Url,
    /// Constant ETH/USD price used instead of CoinGecko. For testing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_eth_usd: Option<f64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("http://localhost:8545").expect("valid url"),
            lens: FUSE_POOL_LENS,
            rss_url: Url::parse(RSS_API_URL).expect("valid url"),
            coingecko_url: Url::parse(COINGECKO_API_URL).expect("valid url"),
            constant_eth_usd: None,
        }
    }
}

/// Refresh scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time between two refresh cycles.
    #[serde(with = "crate::serde::duration")]
    pub interval: Duration,
    /// Delay after which a positive cadence decision is committed.
    ///
    /// Should roughly match how long a task takes to dispatch; a task consulted again before the
    /// delay elapses is allowed to run again.
    #[serde(with = "crate::serde::duration::millis")]
    pub confirm_delay: Duration,
    /// Minimum time between two runs of each task.
    #[serde(default)]
    pub tasks: TaskIntervals,
    /// Pools excluded from every cycle.
    #[serde(default = "default_skipped_pools")]
    pub skipped_pools: Vec<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CYCLE_INTERVAL,
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            tasks: TaskIntervals::default(),
            skipped_pools: default_skipped_pools(),
        }
    }
}

fn default_skipped_pools() -> Vec<u64> {
    SKIPPED_POOLS.to_vec()
}

/// Minimum interval between two runs of each [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIntervals {
    /// RSS score refresh.
    #[serde(with = "crate::serde::duration")]
    pub score: Duration,
    /// CToken event scan.
    #[serde(with = "crate::serde::duration")]
    pub events: Duration,
    /// Reserves and fees refresh.
    #[serde(with = "crate::serde::duration")]
    pub reserves: Duration,
    /// User leverage scan.
    #[serde(with = "crate::serde::duration")]
    pub leverage: Duration,
    /// Staking position refresh.
    #[serde(with = "crate::serde::duration")]
    pub staking: Duration,
}

impl TaskIntervals {
    /// Returns the interval of `task`.
    pub fn interval(&self, task: Task) -> Duration {
        match task {
            Task::Score => self.score,
            Task::Events => self.events,
            Task::Reserves => self.reserves,
            Task::Leverage => self.leverage,
            Task::Staking => self.staking,
        }
    }

    fn interval_mut(&mut self, task: Task) -> &mut Duration {
        match task {
            Task::Score => &mut self.score,
            Task::Events => &mut self.events,
            Task::Reserves => &mut self.reserves,
            Task::Leverage => &mut self.leverage,
            Task::Staking => &mut self.staking,
        }
    }
}

impl Default for TaskIntervals {
    fn default() -> Self {
        Self {
            score: Duration::from_secs(600),
            events: Duration::from_secs(60),
            reserves: Duration::from_secs(300),
            leverage: Duration::from_secs(30),
            staking: Duration::from_secs(60),
        }
    }
}

/// Which CToken events are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Only `LiquidateBorrow`, exported as `fuse_pool_assets_liquidations`.
    #[default]
    Liquidations,
    /// Every known CToken event, exported per event as `fuse_pool_assets_events`.
    All,
}

/// CToken event scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Which events are counted.
    pub mode: EventMode,
    /// First block scanned.
    pub start_block: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { mode: EventMode::default(), start_block: EVENTS_START_BLOCK }
    }
}

/// User leverage classification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeverageConfig {
    /// Accounts with a health at or under this value are liquidatable (WAD).
    pub liquidatable_health: U256,
    /// Accounts with a health at or under this value are at risk (WAD).
    pub at_risk_health: U256,
    /// Accounts borrowing less than this are ignored (WAD). Disabled when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust_threshold: Option<U256>,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            liquidatable_health: LIQUIDATABLE_HEALTH,
            at_risk_health: AT_RISK_HEALTH,
            dust_threshold: None,
        }
    }
}

/// A staking position whose deposited and unclaimed amounts are exported.
///
/// The position is refreshed while processing the pool asset whose underlying token is `token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// The staked token.
    pub token: Address,
    /// The MasterChef-style staking contract.
    pub contract: Address,
    /// The staking account.
    pub account: Address,
    /// The staking pool index.
    pub pool_id: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exporter.yaml");

        let config = ExporterConfig::default()
            .with_port(9000)
            .with_confirm_delay(Some(Duration::from_millis(2500)))
            .with_task_interval(Task::Events, Duration::from_secs(120))
            .with_event_mode(Some(EventMode::All))
            .with_dust_filter(true);
        config.save_to_file(&path).unwrap();

        let loaded = ExporterConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.scheduler.confirm_delay, Duration::from_millis(2500));
        assert_eq!(loaded.scheduler.tasks.interval(Task::Events), Duration::from_secs(120));
        assert_eq!(loaded.scheduler.skipped_pools, vec![4]);
        assert_eq!(loaded.events.mode, EventMode::All);
        assert_eq!(loaded.leverage.dust_threshold, Some(DUST_BORROW));
        assert!(loaded.staking.is_none());
    }

    #[test]
    fn sections_default_when_missing() {
        let config: ExporterConfig =
            serde_yaml::from_str("server:\n  address: 0.0.0.0\n  port: 80\n").unwrap();
        assert_eq!(config.server.port, 80);
        assert_eq!(config.scheduler.interval, DEFAULT_CYCLE_INTERVAL);
        assert_eq!(config.upstream.lens, FUSE_POOL_LENS);
        assert_eq!(config.leverage.at_risk_health, AT_RISK_HEALTH);
    }

    #[test]
    fn partial_scheduler_keeps_default_skip_list() {
        let config: ExporterConfig =
            serde_yaml::from_str("scheduler:\n  interval: 15\n  confirm_delay: 1000\n").unwrap();
        assert_eq!(config.scheduler.interval, Duration::from_secs(15));
        assert_eq!(config.scheduler.skipped_pools, vec![4]);

        let config: ExporterConfig = serde_yaml::from_str(
            "scheduler:\n  interval: 15\n  confirm_delay: 1000\n  skipped_pools: []\n",
        )
        .unwrap();
        assert!(config.scheduler.skipped_pools.is_empty());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        assert!(ExporterConfig::default().validate().is_ok());

        let config: ExporterConfig =
            serde_yaml::from_str("scheduler:\n  interval: 0\n  confirm_delay: 1000\n").unwrap();
        assert!(config.validate().is_err());

        for task in Task::ALL {
            let config = ExporterConfig::default().with_task_interval(task, Duration::ZERO);
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(&task.to_string()), "{err}");
        }
    }

    #[test]
    fn cli_values_override_only_when_set() {
        let config = ExporterConfig::default().with_constant_eth_usd(Some(3000.0));
        let config = config.with_constant_eth_usd(None).with_endpoint(None);
        assert_eq!(config.upstream.constant_eth_usd, Some(3000.0));
        assert_eq!(config.upstream.endpoint.as_str(), "http://localhost:8545/");
    }
}
