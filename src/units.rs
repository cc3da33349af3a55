//! Fixed-point conversions used to derive metric values.
use crate::{
    constants::{BLOCKS_PER_DAY, DAYS_PER_YEAR, PRICED_AMOUNT_DECIMALS, WAD_DECIMALS},
    error::ConversionError,
};
use alloy::primitives::{U256, utils::format_units};

/// Formats a U256 value into a f64 with the specified number of decimals.
pub fn format_units_f64(value: U256, decimals: u8) -> Result<f64, ConversionError> {
    Ok(format_units(value, decimals)?.parse::<f64>()?)
}

/// Returns the USD value of a raw token amount.
///
/// `price` is the underlying price in ETH as reported by the pool oracle, scaled so that
/// `amount * price` carries 36 decimals. `eth_usd` converts the ETH value to USD.
pub fn usd_value(amount: U256, price: U256, eth_usd: f64) -> Result<f64, ConversionError> {
    let eth_value = amount.checked_mul(price).ok_or(ConversionError::Overflow)?;
    Ok(format_units_f64(eth_value, PRICED_AMOUNT_DECIMALS)? * eth_usd)
}

/// Inverse of [`usd_value`]: returns the raw token amount worth `usd`.
pub fn raw_amount_from_usd(usd: f64, price: U256, eth_usd: f64) -> Result<f64, ConversionError> {
    let price = format_units_f64(price, 0)?;
    Ok(usd / eth_usd * 10f64.powi(PRICED_AMOUNT_DECIMALS as i32) / price)
}

/// Compounds a per-block rate (WAD) into an annual percentage yield.
///
/// Interest is assumed to compound daily over [`DAYS_PER_YEAR`] days of [`BLOCKS_PER_DAY`]
/// blocks.
pub fn annual_percentage_yield(rate_per_block: U256) -> Result<f64, ConversionError> {
    let rate = format_units_f64(rate_per_block, WAD_DECIMALS)?;
    Ok(((rate * BLOCKS_PER_DAY as f64 + 1.0).powf(DAYS_PER_YEAR as f64) - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn test_format_units_f64() {
        let value = U256::from_str("12345678901234567890").unwrap();
        assert_eq!(format_units_f64(value, 18).unwrap(), 12.345678901234567);
        assert_eq!(format_units_f64(U256::from(1_500_000u64), 6).unwrap(), 1.5);
    }

    #[test]
    fn usd_value_of_priced_supply() {
        // 1000 tokens (18 decimals) priced at 2 ETH with ETH at 3000 USD.
        let supply = U256::from(10u64).pow(U256::from(21u64));
        let price = U256::from(2_000_000_000_000_000_000u64);
        assert_eq!(usd_value(supply, price, 3000.0).unwrap(), 6_000_000.0);
    }

    #[test]
    fn usd_value_overflow() {
        assert!(matches!(
            usd_value(U256::MAX, U256::from(2u64), 1.0),
            Err(ConversionError::Overflow)
        ));
    }

    #[test]
    fn apy_of_known_rate() {
        let rate = U256::from(10_000_000_000_000u64);
        let expected = ((0.00001 * 5760.0 + 1.0f64).powf(365.0) - 1.0) * 100.0;
        assert_eq!(annual_percentage_yield(rate).unwrap(), expected);
    }

    #[test]
    fn apy_of_zero_rate() {
        assert_eq!(annual_percentage_yield(U256::ZERO).unwrap(), 0.0);
    }

    proptest! {
        /// Converting to USD and back recovers the raw amount for common token decimals.
        #[test]
        fn usd_round_trip(
            decimals in prop::sample::select(vec![6u8, 8, 18]),
            whole in 1u64..1_000_000_000,
            price_milli in 1u64..10_000_000,
            eth_usd in 1.0f64..100_000.0,
        ) {
            let amount = U256::from(whole) * U256::from(10u64).pow(U256::from(decimals));
            // The oracle scales prices to 36 - decimals.
            let price = U256::from(price_milli)
                * U256::from(10u64).pow(U256::from(36 - decimals as u64 - 3));

            let usd = usd_value(amount, price, eth_usd).unwrap();
            let recovered = raw_amount_from_usd(usd, price, eth_usd).unwrap();
            let raw = format_units_f64(amount, 0).unwrap();

            prop_assert!(((recovered - raw) / raw).abs() < 1e-9);
        }
    }
}
