//! Upstream data sources.

mod api;
pub use api::{LendingSource, Result};

mod contracts;
pub use contracts::{ICToken, IFusePoolLens, IMasterChef};

mod lens;
pub use lens::FuseSource;

mod memory;
pub use memory::{InMemorySource, SourceCall};

mod price;
pub use price::PriceFeed;

mod rss;
pub use rss::RssClient;

use crate::{
    config::{EventMode, StakingConfig},
    types::{Asset, Pool, PoolScore, UserHealthRecord},
};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// Upstream data source shared by every refresh task.
#[derive(Debug, Clone)]
pub struct DataSource {
    inner: Arc<dyn LendingSource>,
}

impl DataSource {
    /// Create a [`DataSource`] reading from the Fuse contracts.
    pub fn fuse(source: FuseSource) -> Self {
        Self { inner: Arc::new(source) }
    }

    /// Create a [`DataSource`] with an in-memory backend. Used for testing only.
    pub fn in_memory(source: InMemorySource) -> Self {
        Self { inner: Arc::new(source) }
    }
}

#[async_trait]
impl LendingSource for DataSource {
    async fn pools(&self) -> Result<Vec<Pool>> {
        self.inner.pools().await
    }

    async fn eth_usd_price(&self) -> Result<f64> {
        self.inner.eth_usd_price().await
    }

    async fn pool_assets(&self, comptroller: Address) -> Result<Vec<Asset>> {
        self.inner.pool_assets(comptroller).await
    }

    async fn pool_score(&self, pool_id: u64) -> Result<PoolScore> {
        self.inner.pool_score(pool_id).await
    }

    async fn users_under_health(
        &self,
        comptroller: Address,
        max_health: U256,
    ) -> Result<Vec<UserHealthRecord>> {
        self.inner.users_under_health(comptroller, max_health).await
    }

    async fn asset_events(
        &self,
        ctoken: Address,
        mode: EventMode,
        from_block: u64,
    ) -> Result<Vec<String>> {
        self.inner.asset_events(ctoken, mode, from_block).await
    }

    async fn total_reserves(&self, ctoken: Address) -> Result<U256> {
        self.inner.total_reserves(ctoken).await
    }

    async fn total_fees(&self, ctoken: Address) -> Result<U256> {
        self.inner.total_fees(ctoken).await
    }

    async fn staked_amount(&self, staking: &StakingConfig) -> Result<U256> {
        self.inner.staked_amount(staking).await
    }

    async fn unclaimed_rewards(&self, staking: &StakingConfig) -> Result<U256> {
        self.inner.unclaimed_rewards(staking).await
    }
}
