use super::{CadenceTracker, Task};
use crate::{
    config::{EventMode, ExporterConfig, StakingConfig},
    error::{ConversionError, RefreshError},
    metrics::FuseGauge,
    source::{DataSource, LendingSource},
    types::{Asset, LeverageLevel, LeverageTiers, Pool, Side},
};
use alloy::primitives::U256;
use itertools::Itertools;
use std::{fmt::Display, future::Future, sync::Arc};
use tokio::try_join;
use tracing::{Instrument, Level, Span, debug, info, span, warn};

/// One pass over every pool, feeding derived values into the [`FuseGauge`]s.
///
/// A cycle only awaits the pool list and the ETH/USD price. Everything else is spawned and
/// detached: per-pool and per-asset work may still be in flight when [`RefreshCycle::run`]
/// returns, and a failure is logged where the work was spawned without affecting its siblings.
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    source: DataSource,
    cadence: CadenceTracker,
    config: Arc<ExporterConfig>,
}

impl RefreshCycle {
    /// Creates a new [`RefreshCycle`].
    pub fn new(source: DataSource, cadence: CadenceTracker, config: Arc<ExporterConfig>) -> Self {
        Self { source, cadence, config }
    }

    /// Returns the cadence tracker gating the optional tasks.
    pub fn cadence(&self) -> &CadenceTracker {
        &self.cadence
    }

    /// Runs one cycle.
    ///
    /// Fails only if the pool list or the ETH/USD price cannot be fetched, in which case nothing
    /// is dispatched.
    pub async fn run(&self) -> Result<(), RefreshError> {
        let (pools, eth_usd) = try_join!(self.source.pools(), self.source.eth_usd_price())?;
        info!(pools = pools.len(), eth_usd, "Fetched base data");

        for pool in pools {
            if self.config.scheduler.skipped_pools.contains(&pool.id) {
                debug!(pool = pool.id, "Skipping pool");
                continue;
            }

            debug!(pool = pool.id, name = ?pool.name, "Refreshing pool");

            if self.is_due(Task::Score) {
                spawn_logged(
                    Task::Score,
                    span!(Level::DEBUG, "score", pool = pool.id),
                    self.clone().refresh_score(pool.id),
                );
            }

            spawn_logged(
                "asset-refresh",
                span!(Level::DEBUG, "assets", pool = pool.id),
                self.clone().refresh_assets(pool.clone(), eth_usd),
            );

            if self.is_due(Task::Leverage) {
                spawn_logged(
                    Task::Leverage,
                    span!(Level::DEBUG, "leverage", pool = pool.id),
                    self.clone().refresh_leverage(pool),
                );
            }
        }

        Ok(())
    }

    /// Consults the cadence tracker for `task`.
    fn is_due(&self, task: Task) -> bool {
        let interval = self.config.scheduler.tasks.interval(task);
        self.cadence.should_run(task, interval, task == Task::Staking)
    }

    /// Fetches the assets of a pool, writes their market values and dispatches their tasks.
    async fn refresh_assets(self, pool: Pool, eth_usd: f64) -> Result<(), RefreshError> {
        let assets = self.source.pool_assets(pool.comptroller).await?;
        debug!(assets = assets.len(), "Fetched pool assets");

        let id = pool.label();
        for asset in assets {
            record_market(&id, &asset, eth_usd);

            if self.is_due(Task::Events) {
                spawn_logged(
                    Task::Events,
                    span!(Level::DEBUG, "events", symbol = %asset.underlying_symbol),
                    self.clone().refresh_events(id.clone(), asset.clone()),
                );
            }

            if self.is_due(Task::Reserves) {
                spawn_logged(
                    Task::Reserves,
                    span!(Level::DEBUG, "reserves", symbol = %asset.underlying_symbol),
                    self.clone().refresh_reserves(id.clone(), asset.clone(), eth_usd),
                );
            }

            if let Some(staking) = &self.config.staking
                && asset.underlying_token == staking.token
                && self.is_due(Task::Staking)
            {
                spawn_logged(
                    Task::Staking,
                    span!(Level::DEBUG, "staking", symbol = %asset.underlying_symbol),
                    self.clone().refresh_staking(staking.clone(), asset.clone(), eth_usd),
                );
            }
        }

        Ok(())
    }

    /// Counts the CToken events of an asset.
    async fn refresh_events(self, id: String, asset: Asset) -> Result<(), RefreshError> {
        let events = &self.config.events;
        let names = self.source.asset_events(asset.ctoken, events.mode, events.start_block).await?;
        debug!(events = names.len(), mode = ?events.mode, "Fetched asset events");

        let symbol = asset.underlying_symbol.as_str();
        match events.mode {
            EventMode::Liquidations => {
                FuseGauge::Liquidations.set(&[id.as_str(), symbol], names.len() as f64);
            }
            EventMode::All => {
                for (event, count) in names.iter().counts() {
                    FuseGauge::Events.set(&[id.as_str(), symbol, event.as_str()], count as f64);
                }
            }
        }

        Ok(())
    }

    /// Refreshes the reserves and protocol fees of an asset.
    ///
    /// Both values are read and written independently: one failing does not prevent writing the
    /// other.
    async fn refresh_reserves(
        self,
        id: String,
        asset: Asset,
        eth_usd: f64,
    ) -> Result<(), RefreshError> {
        let (reserves, fees) = tokio::join!(
            self.source.total_reserves(asset.ctoken),
            self.source.total_fees(asset.ctoken)
        );

        let labels = [id.as_str(), asset.underlying_symbol.as_str()];
        let reserves = reserves.map_err(RefreshError::from).and_then(|raw| {
            record_priced(
                &labels,
                &asset,
                raw,
                eth_usd,
                FuseGauge::ReservesAmount,
                FuseGauge::ReservesUsd,
            )
            .map_err(Into::into)
        });
        let fees = fees.map_err(RefreshError::from).and_then(|raw| {
            record_priced(&labels, &asset, raw, eth_usd, FuseGauge::FeesAmount, FuseGauge::FeesUsd)
                .map_err(Into::into)
        });

        reserves.and(fees)
    }

    /// Refreshes the staking position, priced like the asset holding the staked token.
    async fn refresh_staking(
        self,
        staking: StakingConfig,
        asset: Asset,
        eth_usd: f64,
    ) -> Result<(), RefreshError> {
        let (deposited, unclaimed) = tokio::join!(
            self.source.staked_amount(&staking),
            self.source.unclaimed_rewards(&staking)
        );

        let deposited = deposited.map_err(RefreshError::from).and_then(|raw| {
            record_priced(
                &[],
                &asset,
                raw,
                eth_usd,
                FuseGauge::StakingDepositedAmount,
                FuseGauge::StakingDepositedUsd,
            )
            .map_err(Into::into)
        });
        let unclaimed = unclaimed.map_err(RefreshError::from).and_then(|raw| {
            record_priced(
                &[],
                &asset,
                raw,
                eth_usd,
                FuseGauge::StakingUnclaimedAmount,
                FuseGauge::StakingUnclaimedUsd,
            )
            .map_err(Into::into)
        });

        deposited.and(unclaimed)
    }

    /// Classifies the borrowers of a pool into leverage tiers.
    async fn refresh_leverage(self, pool: Pool) -> Result<(), RefreshError> {
        let leverage = &self.config.leverage;
        let (liquidatable, at_risk) = try_join!(
            self.source.users_under_health(pool.comptroller, leverage.liquidatable_health),
            self.source.users_under_health(pool.comptroller, leverage.at_risk_health)
        )?;

        let tiers = LeverageTiers::classify(&liquidatable, &at_risk, leverage.dust_threshold);
        debug!(?tiers, "Classified pool users");

        let id = pool.label();
        for level in [LeverageLevel::Liquidatable, LeverageLevel::AtRisk] {
            let count = tiers.count(level) as f64;
            FuseGauge::UserLeverage.set(&[id.clone(), level.to_string()], count);
        }

        Ok(())
    }

    /// Refreshes the RSS score of a pool.
    async fn refresh_score(self, pool_id: u64) -> Result<(), RefreshError> {
        let score = self.source.pool_score(pool_id).await?;
        debug!(last_updated = %score.last_updated, "Fetched pool score");

        FuseGauge::PoolRss.set(&[pool_id.to_string()], score.total_score);

        Ok(())
    }
}

/// Writes the supplied and borrowed amounts, their USD values and the interest rates of an asset.
///
/// Totals and rates of each side are converted and written on their own: a failed conversion
/// only leaves its own samples at their previous value.
fn record_market(id: &str, asset: &Asset, eth_usd: f64) {
    let symbol = asset.underlying_symbol.as_str();

    for side in [Side::Supply, Side::Borrow] {
        let (amount, usd) = match side {
            Side::Supply => (FuseGauge::SupplyAmount, FuseGauge::SupplyUsd),
            Side::Borrow => (FuseGauge::BorrowAmount, FuseGauge::BorrowUsd),
        };
        if let Err(err) =
            record_priced(&[id, symbol], asset, asset.total(side), eth_usd, amount, usd)
        {
            warn!(%err, symbol, %side, "Failed to convert market totals");
        }

        let side_label = side.to_string();
        match asset.apy(side) {
            Ok(apy) => FuseGauge::InterestRate.set(&[id, symbol, side_label.as_str()], apy),
            Err(err) => warn!(%err, symbol, %side, "Failed to convert interest rate"),
        }
    }
}

/// Writes `raw` in whole tokens to `amount` and in USD to `usd`.
///
/// Both values are converted before either is written.
fn record_priced(
    labels: &[&str],
    asset: &Asset,
    raw: U256,
    eth_usd: f64,
    amount: FuseGauge,
    usd: FuseGauge,
) -> Result<(), ConversionError> {
    let (whole, value) = (asset.amount(raw)?, asset.usd(raw, eth_usd)?);
    amount.set(labels, whole);
    usd.set(labels, value);
    Ok(())
}

/// Spawns a detached refresh task, logging its failure.
fn spawn_logged<F>(task: impl Display + Send + 'static, span: Span, fut: F)
where
    F: Future<Output = Result<(), RefreshError>> + Send + 'static,
{
    tokio::spawn(
        async move {
            if let Err(err) = fut.await {
                warn!(%err, %task, "Refresh task failed");
            }
        }
        .instrument(span),
    );
}
