use alloy::primitives::{Address, U256};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A borrowing account returned by a health query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHealthRecord {
    /// The borrower.
    pub account: Address,
    /// Total borrowed by the account, in ETH (WAD).
    pub total_borrow: U256,
}

impl UserHealthRecord {
    /// Creates a [`UserHealthRecord`].
    pub fn new(account: Address, total_borrow: U256) -> Self {
        Self { account, total_borrow }
    }
}

/// Leverage tier of a borrowing account.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeverageLevel {
    /// Health is under the at-risk threshold but the account cannot be liquidated yet.
    #[display("at_risk")]
    AtRisk,
    /// Health is under the liquidation threshold.
    #[display("liquidatable")]
    Liquidatable,
}

/// Number of accounts of a pool in each [`LeverageLevel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeverageTiers {
    /// Accounts that can be liquidated.
    pub liquidatable: usize,
    /// Accounts at risk that are not already liquidatable.
    pub at_risk: usize,
}

impl LeverageTiers {
    /// Classifies accounts from the two health queries of a pool.
    ///
    /// `at_risk` is expected to be a superset of `liquidatable`. Accounts present in both are only
    /// counted as liquidatable. When `dust` is set, accounts borrowing less than it are ignored.
    pub fn classify(
        liquidatable: &[UserHealthRecord],
        at_risk: &[UserHealthRecord],
        dust: Option<U256>,
    ) -> Self {
        let accounts = |records: &[UserHealthRecord]| -> HashSet<Address> {
            records
                .iter()
                .filter(|record| dust.is_none_or(|dust| record.total_borrow >= dust))
                .map(|record| record.account)
                .collect()
        };

        let liquidatable = accounts(liquidatable);
        let at_risk = accounts(at_risk);

        Self {
            liquidatable: liquidatable.len(),
            at_risk: at_risk.difference(&liquidatable).count(),
        }
    }

    /// Returns the count for `level`.
    pub fn count(&self, level: LeverageLevel) -> usize {
        match level {
            LeverageLevel::AtRisk => self.at_risk,
            LeverageLevel::Liquidatable => self.liquidatable,
        }
    }
}
