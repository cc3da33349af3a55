//! Exporter constants.

use alloy::primitives::{Address, U256, address};
use std::time::Duration;

/// The mainnet `FusePoolLens` deployment used to enumerate pools, assets and users.
pub const FUSE_POOL_LENS: Address = address!("0x6Dc585Ad66A10214Ef0502492B0CC02F0e836eec");

/// Base URL of the Rari risk scoring (RSS) API.
pub const RSS_API_URL: &str = "https://app.rari.capital";

/// Base URL of the CoinGecko API used for the ETH/USD conversion factor.
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com";

/// The port the HTTP surface is served on by default.
pub const DEFAULT_PORT: u16 = 1336;

/// Expected number of blocks mined per minute.
pub const BLOCKS_PER_MINUTE: u64 = 4;

/// Expected number of blocks mined per day.
pub const BLOCKS_PER_DAY: u64 = BLOCKS_PER_MINUTE * 60 * 24;

/// Days used to compound per-day rates into an annual yield.
pub const DAYS_PER_YEAR: u32 = 365;

/// Decimals of the fixed-point values returned by the lens (rates, health, prices).
pub const WAD_DECIMALS: u8 = 18;

/// Decimals of `amount * underlyingPrice`, the fixed-point scale of a USD-denominated product.
pub const PRICED_AMOUNT_DECIMALS: u8 = 36;

/// First block scanned for CToken events.
///
/// Roughly the deployment block of the first Fuse pools.
pub const EVENTS_START_BLOCK: u64 = 12_060_000;

/// Accounts with a health at or under this value can be liquidated (1.0 in WAD).
pub const LIQUIDATABLE_HEALTH: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Accounts with a health at or under this value are considered at risk (1.1 in WAD).
pub const AT_RISK_HEALTH: U256 = U256::from_limbs([1_100_000_000_000_000_000, 0, 0, 0]);

/// Borrow positions under this amount are ignored when the dust filter is enabled (0.1 in WAD).
pub const DUST_BORROW: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

/// Pools excluded from every refresh cycle.
///
/// Pool 4 has an asset whose lens call reverts.
pub const SKIPPED_POOLS: &[u64] = &[4];

/// Time between two refresh cycles.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(15);

/// Delay after which a cadence decision is committed.
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(1);

/// Interval between two recorder upkeeps.
pub const RECORDER_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);
