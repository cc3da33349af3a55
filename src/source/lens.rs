//! [`LendingSource`] backed by the Fuse contracts.
use super::{
    LendingSource,
    api::Result,
    contracts::{ICToken, IFusePoolLens, IMasterChef, ctoken_event_name},
    price::PriceFeed,
    rss::RssClient,
};
use crate::{
    config::{EventMode, StakingConfig},
    error::SourceError,
    types::{Asset, Pool, PoolScore, UserHealthRecord},
};
use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, U256},
    providers::{DynProvider, Provider},
    rpc::types::Filter,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use itertools::Itertools;
use tracing::trace;

/// Reads pools, assets and users through the `FusePoolLens` and CToken contracts.
#[derive(Debug, Clone)]
pub struct FuseSource {
    provider: DynProvider,
    lens: Address,
    price: PriceFeed,
    rss: RssClient,
}

impl FuseSource {
    /// Creates a new [`FuseSource`].
    pub fn new(provider: DynProvider, lens: Address, price: PriceFeed, rss: RssClient) -> Self {
        Self { provider, lens, price, rss }
    }

    fn lens(&self) -> IFusePoolLens::IFusePoolLensInstance<&DynProvider> {
        IFusePoolLens::new(self.lens, &self.provider)
    }
}

#[async_trait]
impl LendingSource for FuseSource {
    async fn pools(&self) -> Result<Vec<Pool>> {
        let data = self.lens().getPublicPoolsWithData().call().await?;

        if data.ids.len() != data.pools.len() {
            return Err(SourceError::invalid_field(
                "pools",
                format!("{} ids for {} pools", data.ids.len(), data.pools.len()),
            ));
        }

        data.ids
            .into_iter()
            .zip(data.pools)
            .map(|(id, pool)| {
                let id =
                    u64::try_from(id).map_err(|err| SourceError::invalid_field("pool id", err))?;
                Ok(Pool {
                    id,
                    comptroller: pool.comptroller,
                    name: Some(pool.name).filter(|name| !name.is_empty()),
                    creator: Some(pool.creator),
                })
            })
            .collect()
    }

    async fn eth_usd_price(&self) -> Result<f64> {
        self.price.eth_usd().await
    }

    async fn pool_assets(&self, comptroller: Address) -> Result<Vec<Asset>> {
        let assets = self
            .lens()
            .getPoolAssetsWithData(comptroller)
            .from(Address::ZERO)
            .call()
            .await?;

        assets
            .into_iter()
            .map(|asset| {
                Ok(Asset {
                    ctoken: asset.cToken,
                    underlying_token: asset.underlyingToken,
                    underlying_decimals: u8::try_from(asset.underlyingDecimals)
                        .map_err(|err| SourceError::invalid_field("underlyingDecimals", err))?,
                    underlying_symbol: asset.underlyingSymbol,
                    underlying_price: asset.underlyingPrice,
                    supply_rate_per_block: asset.supplyRatePerBlock,
                    borrow_rate_per_block: asset.borrowRatePerBlock,
                    total_supply: asset.totalSupply,
                    total_borrow: asset.totalBorrow,
                    underlying_name: Some(asset.underlyingName),
                    collateral_factor: Some(asset.collateralFactor),
                    reserve_factor: Some(asset.reserveFactor),
                })
            })
            .collect()
    }

    async fn pool_score(&self, pool_id: u64) -> Result<PoolScore> {
        self.rss.score(pool_id).await
    }

    async fn users_under_health(
        &self,
        comptroller: Address,
        max_health: U256,
    ) -> Result<Vec<UserHealthRecord>> {
        let data = self.lens().getPoolUsersWithData(comptroller, max_health).call().await?;

        Ok(data
            .users
            .into_iter()
            .map(|user| UserHealthRecord::new(user.account, user.totalBorrow))
            .collect())
    }

    async fn asset_events(
        &self,
        ctoken: Address,
        mode: EventMode,
        from_block: u64,
    ) -> Result<Vec<String>> {
        let mut filter = Filter::new()
            .address(ctoken)
            .from_block(from_block)
            .to_block(BlockNumberOrTag::Latest);
        if mode == EventMode::Liquidations {
            filter = filter.event_signature(ICToken::LiquidateBorrow::SIGNATURE_HASH);
        }

        let logs = self.provider.get_logs(&filter).await?;
        trace!(%ctoken, logs = logs.len(), "Fetched CToken logs");

        Ok(logs
            .iter()
            .map(|log| log.topics().first().and_then(ctoken_event_name).unwrap_or("Unknown"))
            .map(str::to_string)
            .collect_vec())
    }

    async fn total_reserves(&self, ctoken: Address) -> Result<U256> {
        Ok(ICToken::new(ctoken, &self.provider).totalReserves().call().await?)
    }

    async fn total_fees(&self, ctoken: Address) -> Result<U256> {
        Ok(ICToken::new(ctoken, &self.provider).totalFuseFees().call().await?)
    }

    async fn staked_amount(&self, staking: &StakingConfig) -> Result<U256> {
        Ok(IMasterChef::new(staking.contract, &self.provider)
            .userInfo(staking.pool_id, staking.account)
            .call()
            .await?
            .amount)
    }

    async fn unclaimed_rewards(&self, staking: &StakingConfig) -> Result<U256> {
        Ok(IMasterChef::new(staking.contract, &self.provider)
            .pendingSushi(staking.pool_id, staking.account)
            .call()
            .await?)
    }
}
