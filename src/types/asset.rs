use crate::{
    error::ConversionError,
    units::{annual_percentage_yield, format_units_f64, usd_value},
};
use alloy::primitives::{Address, U256};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Side of a market an interest rate applies to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Rate earned by suppliers.
    #[display("supply")]
    Supply,
    /// Rate paid by borrowers.
    #[display("borrow")]
    Borrow,
}

/// A market of a [`Pool`](crate::types::Pool), backed by a CToken.
///
/// All amounts are raw fixed-point values as returned by the lens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// The CToken contract of this market.
    pub ctoken: Address,
    /// The underlying token.
    pub underlying_token: Address,
    /// Symbol of the underlying token.
    pub underlying_symbol: String,
    /// Decimals of the underlying token.
    pub underlying_decimals: u8,
    /// Price of the underlying token in ETH, scaled to `36 - underlying_decimals` decimals.
    pub underlying_price: U256,
    /// Per-block supply rate (WAD).
    pub supply_rate_per_block: U256,
    /// Per-block borrow rate (WAD).
    pub borrow_rate_per_block: U256,
    /// Total supplied, in underlying units.
    pub total_supply: U256,
    /// Total borrowed, in underlying units.
    pub total_borrow: U256,
    /// Name of the underlying token, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying_name: Option<String>,
    /// Collateral factor (WAD), if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_factor: Option<U256>,
    /// Reserve factor (WAD), if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_factor: Option<U256>,
}

impl Asset {
    /// Converts a raw amount of the underlying token to whole units.
    pub fn amount(&self, raw: U256) -> Result<f64, ConversionError> {
        format_units_f64(raw, self.underlying_decimals)
    }

    /// Converts a raw amount of the underlying token to USD.
    pub fn usd(&self, raw: U256, eth_usd: f64) -> Result<f64, ConversionError> {
        usd_value(raw, self.underlying_price, eth_usd)
    }

    /// Returns the raw total on the given side of the market.
    pub fn total(&self, side: Side) -> U256 {
        match side {
            Side::Supply => self.total_supply,
            Side::Borrow => self.total_borrow,
        }
    }

    /// Returns the annual percentage yield on the given side of the market.
    pub fn apy(&self, side: Side) -> Result<f64, ConversionError> {
        annual_percentage_yield(match side {
            Side::Supply => self.supply_rate_per_block,
            Side::Borrow => self.borrow_rate_per_block,
        })
    }
}
