use metrics::{Label, describe_gauge, gauge};

/// A gauge family exported by the exporter.
///
/// Each family has a fixed name and an ordered, fixed set of label keys. Setting a sample
/// overwrites the previous value of the exact label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuseGauge {
    /// RSS score of a pool.
    PoolRss,
    /// Supplied amount of an asset, in whole tokens.
    SupplyAmount,
    /// Borrowed amount of an asset, in whole tokens.
    BorrowAmount,
    /// Supplied amount of an asset, in USD.
    SupplyUsd,
    /// Borrowed amount of an asset, in USD.
    BorrowUsd,
    /// Annual percentage yield on either side of an asset.
    InterestRate,
    /// Number of `LiquidateBorrow` events of an asset.
    Liquidations,
    /// Number of events of an asset, per event.
    Events,
    /// Reserves of an asset, in whole tokens.
    ReservesAmount,
    /// Reserves of an asset, in USD.
    ReservesUsd,
    /// Protocol fees of an asset, in whole tokens.
    FeesAmount,
    /// Protocol fees of an asset, in USD.
    FeesUsd,
    /// Number of users of a pool per leverage level.
    UserLeverage,
    /// Tokens deposited in the tracked staking position.
    StakingDepositedAmount,
    /// USD value of the tracked staking position.
    StakingDepositedUsd,
    /// Unclaimed rewards of the tracked staking position.
    StakingUnclaimedAmount,
    /// USD value of the unclaimed rewards.
    StakingUnclaimedUsd,
}

impl FuseGauge {
    /// Every gauge family.
    pub const ALL: [Self; 17] = [
        Self::PoolRss,
        Self::SupplyAmount,
        Self::BorrowAmount,
        Self::SupplyUsd,
        Self::BorrowUsd,
        Self::InterestRate,
        Self::Liquidations,
        Self::Events,
        Self::ReservesAmount,
        Self::ReservesUsd,
        Self::FeesAmount,
        Self::FeesUsd,
        Self::UserLeverage,
        Self::StakingDepositedAmount,
        Self::StakingDepositedUsd,
        Self::StakingUnclaimedAmount,
        Self::StakingUnclaimedUsd,
    ];

    /// Exported metric name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PoolRss => "fuse_pool_rss",
            Self::SupplyAmount => "fuse_pool_assets_supply_amount",
            Self::BorrowAmount => "fuse_pool_assets_borrow_amount",
            Self::SupplyUsd => "fuse_pool_assets_supply_usd",
            Self::BorrowUsd => "fuse_pool_assets_borrow_usd",
            Self::InterestRate => "fuse_pool_assets_interest_rate",
            Self::Liquidations => "fuse_pool_assets_liquidations",
            Self::Events => "fuse_pool_assets_events",
            Self::ReservesAmount => "fuse_pool_assets_reserves_amount",
            Self::ReservesUsd => "fuse_pool_assets_reserves_usd",
            Self::FeesAmount => "fuse_pool_assets_fees_amount",
            Self::FeesUsd => "fuse_pool_assets_fees_usd",
            Self::UserLeverage => "fuse_userLeverage",
            Self::StakingDepositedAmount => "fuse_staking_deposited_amount",
            Self::StakingDepositedUsd => "fuse_staking_deposited_usd",
            Self::StakingUnclaimedAmount => "fuse_staking_unclaimed_amount",
            Self::StakingUnclaimedUsd => "fuse_staking_unclaimed_usd",
        }
    }

    /// Label keys, in the order label values are passed to [`Self::set`].
    pub const fn label_keys(self) -> &'static [&'static str] {
        match self {
            Self::PoolRss => &["id"],
            Self::SupplyAmount
            | Self::BorrowAmount
            | Self::SupplyUsd
            | Self::BorrowUsd
            | Self::Liquidations
            | Self::ReservesAmount
            | Self::ReservesUsd
            | Self::FeesAmount
            | Self::FeesUsd => &["id", "symbol"],
            Self::InterestRate => &["id", "symbol", "side"],
            Self::Events => &["id", "symbol", "event"],
            Self::UserLeverage => &["id", "level"],
            Self::StakingDepositedAmount
            | Self::StakingDepositedUsd
            | Self::StakingUnclaimedAmount
            | Self::StakingUnclaimedUsd => &[],
        }
    }

    /// Help text of the metric.
    pub const fn help(self) -> &'static str {
        match self {
            Self::PoolRss => "Stores the RSS score of each pool.",
            Self::SupplyAmount => "Stores how much of each asset is supplied in each pool.",
            Self::BorrowAmount => "Stores how much of each asset is borrowed in each pool.",
            Self::SupplyUsd => "Stores the USD value of each asset supplied in each pool.",
            Self::BorrowUsd => "Stores the USD value of each asset borrowed in each pool.",
            Self::InterestRate => "Stores the interest rates of each asset in each pool.",
            Self::Liquidations => {
                "Stores how many liquidations occur for each asset in each pool."
            }
            Self::Events => {
                "Stores how many events of each kind occur for each asset in each pool."
            }
            Self::ReservesAmount => "Stores the reserves of each asset in each pool.",
            Self::ReservesUsd => "Stores the USD value of the reserves of each asset in each pool.",
            Self::FeesAmount => "Stores the protocol fees of each asset in each pool.",
            Self::FeesUsd => {
                "Stores the USD value of the protocol fees of each asset in each pool."
            }
            Self::UserLeverage => "Stores how many users are at different levels of leverage.",
            Self::StakingDepositedAmount => "Stores how many tokens are staked.",
            Self::StakingDepositedUsd => "Stores the USD value of the staked tokens.",
            Self::StakingUnclaimedAmount => "Stores how many staking rewards are unclaimed.",
            Self::StakingUnclaimedUsd => "Stores the USD value of the unclaimed staking rewards.",
        }
    }

    /// Overwrites the sample of this gauge for `label_values`.
    ///
    /// Values are matched to [`Self::label_keys`] by position.
    pub fn set<V: AsRef<str>>(self, label_values: &[V], value: f64) {
        debug_assert_eq!(
            label_values.len(),
            self.label_keys().len(),
            "wrong number of labels for {}",
            self.name()
        );

        let labels: Vec<Label> = self
            .label_keys()
            .iter()
            .zip(label_values)
            .map(|(key, value)| Label::new(*key, value.as_ref().to_string()))
            .collect();

        gauge!(self.name(), labels).set(value);
    }

    /// Overwrites the sample of an unlabeled gauge.
    pub fn set_unlabeled(self, value: f64) {
        self.set::<&str>(&[], value);
    }
}

/// Registers the help text of every [`FuseGauge`] with the installed recorder.
pub fn describe_gauges() {
    for gauge in FuseGauge::ALL {
        describe_gauge!(gauge.name(), gauge.help());
    }
}
