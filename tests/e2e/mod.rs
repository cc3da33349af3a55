//! Exporter end-to-end tests
#![allow(unused)]

mod cases;

use alloy::primitives::{Address, U256};
use eyre::Result;
use fuse_exporter::{
    config::ExporterConfig,
    metrics::setup_recorder,
    scheduler::{CadenceTracker, RefreshCycle},
    source::{DataSource, InMemorySource},
    spawn::{ExporterHandle, try_spawn},
    types::Asset,
};
use std::{net::Ipv4Addr, sync::Arc, time::Duration};
use tokio::time::sleep;

/// Confirmation delay used by cycles driven from tests.
pub const CONFIRM_DELAY: Duration = Duration::from_secs(1);

/// `amount` whole tokens with 18 decimals.
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

/// An asset with 18 decimals, no reserves and zero rates.
pub fn asset(symbol: &str, byte: u8, total_supply: U256, underlying_price: U256) -> Asset {
    Asset {
        ctoken: Address::repeat_byte(byte),
        underlying_token: Address::with_last_byte(byte),
        underlying_symbol: symbol.into(),
        underlying_decimals: 18,
        underlying_price,
        supply_rate_per_block: U256::ZERO,
        borrow_rate_per_block: U256::ZERO,
        total_supply,
        total_borrow: U256::ZERO,
        underlying_name: None,
        collateral_factor: None,
        reserve_factor: None,
    }
}

/// Creates a cycle reading from `source` with a fresh cadence tracker.
pub fn refresh_cycle(source: &InMemorySource, config: ExporterConfig) -> RefreshCycle {
    // make sure the recorder exists before the first sample is written
    setup_recorder();
    RefreshCycle::new(
        DataSource::in_memory(source.clone()),
        CadenceTracker::new(CONFIRM_DELAY),
        Arc::new(config),
    )
}

/// Runs one cycle and waits for its spawned tasks. Time must be paused.
pub async fn run_cycle(cycle: &RefreshCycle) -> Result<()> {
    cycle.run().await?;
    sleep(Duration::from_millis(10)).await;
    Ok(())
}

/// Returns the current exposition text.
pub fn render() -> String {
    setup_recorder().render()
}

/// Returns the value of the sample named `series`, e.g. `fuse_pool_rss{id="7"}`.
pub fn sample(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        let (name, value) = line.rsplit_once(' ')?;
        (name == series).then(|| value.parse().ok()).flatten()
    })
}

/// Returns every sample line carrying `label`, e.g. `id="7"`.
pub fn samples_with(rendered: &str, label: &str) -> Vec<String> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#') && line.contains(label))
        .map(str::to_string)
        .collect()
}

/// A running exporter serving an in-memory source.
pub struct Environment {
    pub source: InMemorySource,
    pub handle: ExporterHandle,
}

impl Environment {
    /// Spawns the exporter on a random local port.
    pub async fn setup(source: InMemorySource, config: ExporterConfig) -> Result<Self> {
        let config = config.with_address(Ipv4Addr::LOCALHOST.into()).with_port(0);
        let handle = try_spawn(config, DataSource::in_memory(source.clone())).await?;
        Ok(Self { source, handle })
    }

    /// Stops the exporter.
    pub async fn cleanup(self) {
        self.handle.stop();
        self.handle.server.stopped().await;
    }
}
