//! Fuse contract bindings.
use alloy::{primitives::B256, sol, sol_types::SolEvent};

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IFusePoolLens {
        struct FusePool {
            string name;
            address creator;
            address comptroller;
            uint256 blockPosted;
            uint256 timestampPosted;
        }

        struct FusePoolAsset {
            address cToken;
            address underlyingToken;
            string underlyingName;
            string underlyingSymbol;
            uint256 underlyingDecimals;
            uint256 underlyingBalance;
            uint256 supplyRatePerBlock;
            uint256 borrowRatePerBlock;
            uint256 totalSupply;
            uint256 totalBorrow;
            uint256 supplyBalance;
            uint256 borrowBalance;
            uint256 liquidity;
            bool membership;
            uint256 exchangeRate;
            uint256 underlyingPrice;
            address oracle;
            uint256 collateralFactor;
            uint256 reserveFactor;
            uint256 adminFee;
            uint256 fuseFee;
        }

        struct FusePoolUser {
            address account;
            uint256 totalBorrow;
            uint256 totalCollateral;
            uint256 health;
            FusePoolAsset[] assets;
        }

        function getPublicPoolsWithData()
            external
            returns (
                uint256[] ids,
                FusePool[] pools,
                uint256[] totalSupply,
                uint256[] totalBorrow,
                address[][] underlyingTokens,
                string[][] underlyingSymbols,
                bool[] errored
            );

        function getPoolAssetsWithData(address comptroller)
            external
            returns (FusePoolAsset[] assets);

        function getPoolUsersWithData(address comptroller, uint256 maxHealth)
            external
            returns (FusePoolUser[] users, uint256 totalSupply, uint256 totalBorrow);
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface ICToken {
        event AccrueInterest(
            uint256 cashPrior,
            uint256 interestAccumulated,
            uint256 borrowIndex,
            uint256 totalBorrows
        );
        event Mint(address minter, uint256 mintAmount, uint256 mintTokens);
        event Redeem(address redeemer, uint256 redeemAmount, uint256 redeemTokens);
        event Borrow(
            address borrower,
            uint256 borrowAmount,
            uint256 accountBorrows,
            uint256 totalBorrows
        );
        event RepayBorrow(
            address payer,
            address borrower,
            uint256 repayAmount,
            uint256 accountBorrows,
            uint256 totalBorrows
        );
        event LiquidateBorrow(
            address liquidator,
            address borrower,
            uint256 repayAmount,
            address cTokenCollateral,
            uint256 seizeTokens
        );
        event Transfer(address indexed from, address indexed to, uint256 amount);
        event Approval(address indexed owner, address indexed spender, uint256 amount);
        event NewComptroller(address oldComptroller, address newComptroller);
        event NewMarketInterestRateModel(
            address oldInterestRateModel,
            address newInterestRateModel
        );
        event NewReserveFactor(uint256 oldReserveFactorMantissa, uint256 newReserveFactorMantissa);
        event NewAdminFee(uint256 oldAdminFeeMantissa, uint256 newAdminFeeMantissa);
        event NewFuseFee(uint256 oldFuseFeeMantissa, uint256 newFuseFeeMantissa);
        event ReservesAdded(address benefactor, uint256 addAmount, uint256 newTotalReserves);
        event ReservesReduced(address admin, uint256 reduceAmount, uint256 newTotalReserves);
        event Failure(uint256 err, uint256 info, uint256 detail);

        function totalReserves() external view returns (uint256);
        function totalFuseFees() external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IMasterChef {
        function userInfo(uint256 pid, address user)
            external
            view
            returns (uint256 amount, uint256 rewardDebt);

        function pendingSushi(uint256 pid, address user) external view returns (uint256);
    }
}

/// Names of the CToken events counted by the event scan, keyed by topic.
const CTOKEN_EVENTS: &[(B256, &str)] = &[
    (ICToken::AccrueInterest::SIGNATURE_HASH, "AccrueInterest"),
    (ICToken::Mint::SIGNATURE_HASH, "Mint"),
    (ICToken::Redeem::SIGNATURE_HASH, "Redeem"),
    (ICToken::Borrow::SIGNATURE_HASH, "Borrow"),
    (ICToken::RepayBorrow::SIGNATURE_HASH, "RepayBorrow"),
    (ICToken::LiquidateBorrow::SIGNATURE_HASH, "LiquidateBorrow"),
    (ICToken::Transfer::SIGNATURE_HASH, "Transfer"),
    (ICToken::Approval::SIGNATURE_HASH, "Approval"),
    (ICToken::NewComptroller::SIGNATURE_HASH, "NewComptroller"),
    (ICToken::NewMarketInterestRateModel::SIGNATURE_HASH, "NewMarketInterestRateModel"),
    (ICToken::NewReserveFactor::SIGNATURE_HASH, "NewReserveFactor"),
    (ICToken::NewAdminFee::SIGNATURE_HASH, "NewAdminFee"),
    (ICToken::NewFuseFee::SIGNATURE_HASH, "NewFuseFee"),
    (ICToken::ReservesAdded::SIGNATURE_HASH, "ReservesAdded"),
    (ICToken::ReservesReduced::SIGNATURE_HASH, "ReservesReduced"),
    (ICToken::Failure::SIGNATURE_HASH, "Failure"),
];

/// Returns the name of the CToken event with the given topic, if known.
pub(crate) fn ctoken_event_name(topic: &B256) -> Option<&'static str> {
    CTOKEN_EVENTS.iter().find(|(hash, _)| hash == topic).map(|(_, name)| *name)
}
