//! [`LendingSource`] implementation in-memory. For testing only.

use super::{LendingSource, api::Result};
use crate::{
    config::{EventMode, StakingConfig},
    error::SourceError,
    types::{Asset, Pool, PoolScore, UserHealthRecord},
};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use derive_more::Display;
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicUsize, Ordering},
};

/// A call of the [`LendingSource`] api, used to count calls and inject failures.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCall {
    /// [`LendingSource::pools`].
    Pools,
    /// [`LendingSource::eth_usd_price`].
    EthUsdPrice,
    /// [`LendingSource::pool_assets`].
    PoolAssets,
    /// [`LendingSource::pool_score`].
    PoolScore,
    /// [`LendingSource::users_under_health`].
    UsersUnderHealth,
    /// [`LendingSource::asset_events`].
    AssetEvents,
    /// [`LendingSource::total_reserves`].
    TotalReserves,
    /// [`LendingSource::total_fees`].
    TotalFees,
    /// [`LendingSource::staked_amount`].
    StakedAmount,
    /// [`LendingSource::unclaimed_rewards`].
    UnclaimedRewards,
}

#[derive(Debug, Default)]
struct Inner {
    pools: RwLock<Vec<Pool>>,
    eth_usd: RwLock<f64>,
    assets: DashMap<Address, Vec<Asset>>,
    scores: DashMap<u64, PoolScore>,
    users: DashMap<Address, Vec<(UserHealthRecord, U256)>>,
    events: DashMap<Address, Vec<String>>,
    reserves: DashMap<Address, (U256, U256)>,
    staking: RwLock<Option<(U256, U256)>>,
    /// Calls failing for every key.
    failing: DashSet<SourceCall>,
    /// Comptrollers, ctokens or pool ids whose calls fail.
    failing_keys: DashSet<String>,
    calls: DashMap<SourceCall, AtomicUsize>,
}

/// [`LendingSource`] implementation in-memory. Used for testing.
///
/// Clones share the same state, so a test can keep a handle to change data between cycles.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    inner: Arc<Inner>,
}

impl InMemorySource {
    /// Sets the ETH/USD price.
    pub fn with_eth_usd(self, price: f64) -> Self {
        *self.inner.eth_usd.write().unwrap_or_else(|err| err.into_inner()) = price;
        self
    }

    /// Adds a pool and its assets.
    pub fn with_pool(self, pool: Pool, assets: Vec<Asset>) -> Self {
        self.inner.assets.insert(pool.comptroller, assets);
        self.inner.pools.write().unwrap_or_else(|err| err.into_inner()).push(pool);
        self
    }

    /// Replaces the assets of the pool administered by `comptroller`.
    pub fn replace_assets(&self, comptroller: Address, assets: Vec<Asset>) {
        self.inner.assets.insert(comptroller, assets);
    }

    /// Sets the RSS score of a pool.
    pub fn with_score(self, pool_id: u64, score: PoolScore) -> Self {
        self.inner.scores.insert(pool_id, score);
        self
    }

    /// Adds a borrower with the given health (WAD) to the pool administered by `comptroller`.
    pub fn with_user(self, comptroller: Address, user: UserHealthRecord, health: U256) -> Self {
        self.inner.users.entry(comptroller).or_default().push((user, health));
        self
    }

    /// Sets the events emitted by `ctoken`, by name.
    pub fn with_events<I, S>(self, ctoken: Address, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.events.insert(ctoken, events.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the reserves and protocol fees held by `ctoken`.
    pub fn with_reserves(self, ctoken: Address, reserves: U256, fees: U256) -> Self {
        self.inner.reserves.insert(ctoken, (reserves, fees));
        self
    }

    /// Sets the deposited and unclaimed amounts of the staking position.
    pub fn with_staking(self, deposited: U256, unclaimed: U256) -> Self {
        *self.inner.staking.write().unwrap_or_else(|err| err.into_inner()) =
            Some((deposited, unclaimed));
        self
    }

    /// Makes every `call` fail.
    pub fn fail(&self, call: SourceCall) {
        self.inner.failing.insert(call);
    }

    /// Makes every call keyed by `key` fail. Keys are comptrollers, ctokens or pool ids.
    pub fn fail_key(&self, key: impl ToString) {
        self.inner.failing_keys.insert(key.to_string());
    }

    /// Clears every injected failure.
    pub fn recover(&self) {
        self.inner.failing.clear();
        self.inner.failing_keys.clear();
    }

    /// Returns how many times `call` was made.
    pub fn calls(&self, call: SourceCall) -> usize {
        self.inner.calls.get(&call).map(|count| count.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn staking_position(&self) -> Result<(U256, U256)> {
        let position = *self.inner.staking.read().unwrap_or_else(|err| err.into_inner());
        position.ok_or_else(|| SourceError::Unavailable("staking position".into()))
    }

    /// Records a call, failing it if a failure was injected for it or for `key`.
    fn record(&self, call: SourceCall, key: Option<&dyn ToString>) -> Result<()> {
        self.inner.calls.entry(call).or_default().fetch_add(1, Ordering::Relaxed);

        let key = key.map(ToString::to_string);
        if self.inner.failing.contains(&call)
            || key.as_ref().is_some_and(|key| self.inner.failing_keys.contains(key))
        {
            return Err(SourceError::Unavailable(match key {
                Some(key) => format!("{call} for {key}"),
                None => call.to_string(),
            }));
        }

        Ok(())
    }
}

#[async_trait]
impl LendingSource for InMemorySource {
    async fn pools(&self) -> Result<Vec<Pool>> {
        self.record(SourceCall::Pools, None)?;
        Ok(self.inner.pools.read().unwrap_or_else(|err| err.into_inner()).clone())
    }

    async fn eth_usd_price(&self) -> Result<f64> {
        self.record(SourceCall::EthUsdPrice, None)?;
        Ok(*self.inner.eth_usd.read().unwrap_or_else(|err| err.into_inner()))
    }

    async fn pool_assets(&self, comptroller: Address) -> Result<Vec<Asset>> {
        self.record(SourceCall::PoolAssets, Some(&comptroller))?;
        self.inner
            .assets
            .get(&comptroller)
            .map(|assets| assets.clone())
            .ok_or_else(|| SourceError::Unavailable(format!("assets of {comptroller}")))
    }

    async fn pool_score(&self, pool_id: u64) -> Result<PoolScore> {
        self.record(SourceCall::PoolScore, Some(&pool_id))?;
        self.inner
            .scores
            .get(&pool_id)
            .map(|score| score.clone())
            .ok_or_else(|| SourceError::Unavailable(format!("score of pool {pool_id}")))
    }

    async fn users_under_health(
        &self,
        comptroller: Address,
        max_health: U256,
    ) -> Result<Vec<UserHealthRecord>> {
        self.record(SourceCall::UsersUnderHealth, Some(&comptroller))?;
        Ok(self
            .inner
            .users
            .get(&comptroller)
            .map(|users| {
                users
                    .iter()
                    .filter(|(_, health)| *health <= max_health)
                    .map(|(user, _)| user.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn asset_events(
        &self,
        ctoken: Address,
        mode: EventMode,
        _from_block: u64,
    ) -> Result<Vec<String>> {
        self.record(SourceCall::AssetEvents, Some(&ctoken))?;
        let events = self.inner.events.get(&ctoken).map(|e| e.clone()).unwrap_or_default();

        Ok(match mode {
            EventMode::Liquidations => {
                events.into_iter().filter(|event| event == "LiquidateBorrow").collect()
            }
            EventMode::All => events,
        })
    }

    async fn total_reserves(&self, ctoken: Address) -> Result<U256> {
        self.record(SourceCall::TotalReserves, Some(&ctoken))?;
        Ok(self.inner.reserves.get(&ctoken).map(|r| r.0).unwrap_or_default())
    }

    async fn total_fees(&self, ctoken: Address) -> Result<U256> {
        self.record(SourceCall::TotalFees, Some(&ctoken))?;
        Ok(self.inner.reserves.get(&ctoken).map(|r| r.1).unwrap_or_default())
    }

    async fn staked_amount(&self, _staking: &StakingConfig) -> Result<U256> {
        self.record(SourceCall::StakedAmount, None)?;
        self.staking_position().map(|(deposited, _)| deposited)
    }

    async fn unclaimed_rewards(&self, _staking: &StakingConfig) -> Result<U256> {
        self.record(SourceCall::UnclaimedRewards, None)?;
        self.staking_position().map(|(_, unclaimed)| unclaimed)
    }
}
