//! Upstream data source api.

use crate::{
    config::{EventMode, StakingConfig},
    error::SourceError,
    types::{Asset, Pool, PoolScore, UserHealthRecord},
};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::Debug;

/// Type alias for `Result<T, SourceError>`
pub type Result<T> = core::result::Result<T, SourceError>;

/// Reads the lending protocol state the exporter derives metrics from.
///
/// Every call is independently fallible and has no latency bound.
#[async_trait]
pub trait LendingSource: Debug + Send + Sync {
    /// Returns every public pool.
    async fn pools(&self) -> Result<Vec<Pool>>;

    /// Returns the price of one ETH in USD.
    async fn eth_usd_price(&self) -> Result<f64>;

    /// Returns every asset of the pool administered by `comptroller`.
    async fn pool_assets(&self, comptroller: Address) -> Result<Vec<Asset>>;

    /// Returns the RSS score of a pool.
    async fn pool_score(&self, pool_id: u64) -> Result<PoolScore>;

    /// Returns the borrowers of a pool whose health is at or under `max_health` (WAD).
    async fn users_under_health(
        &self,
        comptroller: Address,
        max_health: U256,
    ) -> Result<Vec<UserHealthRecord>>;

    /// Returns the names of the events emitted by `ctoken` since `from_block`, one per event.
    ///
    /// With [`EventMode::Liquidations`] only `LiquidateBorrow` events are returned.
    async fn asset_events(
        &self,
        ctoken: Address,
        mode: EventMode,
        from_block: u64,
    ) -> Result<Vec<String>>;

    /// Returns the reserves held by `ctoken`, in underlying units.
    async fn total_reserves(&self, ctoken: Address) -> Result<U256>;

    /// Returns the protocol fees held by `ctoken`, in underlying units.
    async fn total_fees(&self, ctoken: Address) -> Result<U256>;

    /// Returns the amount deposited by the staking position.
    async fn staked_amount(&self, staking: &StakingConfig) -> Result<U256>;

    /// Returns the rewards the staking position can claim.
    async fn unclaimed_rewards(&self, staking: &StakingConfig) -> Result<U256>;
}
