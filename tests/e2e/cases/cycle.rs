use crate::e2e::{
    CONFIRM_DELAY, asset, ether, refresh_cycle, render, run_cycle, sample, samples_with,
};
use alloy::primitives::{Address, U256};
use eyre::Result;
use fuse_exporter::{
    config::{ExporterConfig, StakingConfig},
    source::{InMemorySource, SourceCall},
    types::{Pool, PoolScore, UserHealthRecord},
};
use itertools::Itertools;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn supply_usd_of_priced_asset() -> Result<()> {
    let comptroller = Address::repeat_byte(0x07);
    let source = InMemorySource::default()
        .with_eth_usd(3000.0)
        .with_pool(Pool::new(7, comptroller), vec![asset("TKN", 0x70, ether(1000), ether(2))]);

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_supply_usd{id="7",symbol="TKN"}"#),
        Some(6_000_000.0)
    );
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_supply_amount{id="7",symbol="TKN"}"#),
        Some(1000.0)
    );
    assert_eq!(sample(&rendered, r#"fuse_pool_assets_borrow_usd{id="7",symbol="TKN"}"#), Some(0.0));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn interest_rates_are_compounded_daily() -> Result<()> {
    let mut market = asset("APY", 0x71, ether(1), ether(1));
    market.supply_rate_per_block = U256::from(10_000_000_000_000u64);
    market.borrow_rate_per_block = U256::from(20_000_000_000_000u64);
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(8, Address::repeat_byte(0x08)), vec![market]);

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    let supply = ((0.00001f64 * 5760.0 + 1.0).powf(365.0) - 1.0) * 100.0;
    let borrow = ((0.00002f64 * 5760.0 + 1.0).powf(365.0) - 1.0) * 100.0;
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_interest_rate{id="8",symbol="APY",side="supply"}"#),
        Some(supply)
    );
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_interest_rate{id="8",symbol="APY",side="borrow"}"#),
        Some(borrow)
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn skipped_pool_writes_nothing() -> Result<()> {
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_score(4, PoolScore::new(50.0))
        .with_pool(
            Pool::new(4, Address::repeat_byte(0x04)),
            vec![asset("BRK", 0x72, ether(1), ether(1))],
        )
        .with_pool(
            Pool::new(9, Address::repeat_byte(0x09)),
            vec![asset("OK", 0x73, ether(1), ether(1))],
        );

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert!(samples_with(&rendered, r#"id="4""#).is_empty(), "{rendered}");
    assert!(!samples_with(&rendered, r#"id="9""#).is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_pool_does_not_block_siblings() -> Result<()> {
    let failing = Address::repeat_byte(0x21);
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(21, failing), vec![asset("FAIL", 0x74, ether(1), ether(1))])
        .with_pool(
            Pool::new(22, Address::repeat_byte(0x22)),
            vec![asset("FINE", 0x75, ether(3), ether(1))],
        );
    source.fail_key(failing);

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert!(samples_with(&rendered, r#"symbol="FAIL""#).is_empty());
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_supply_amount{id="22",symbol="FINE"}"#),
        Some(3.0)
    );
    assert_eq!(source.calls(SourceCall::PoolAssets), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_base_data_abandons_cycle() -> Result<()> {
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(
            Pool::new(23, Address::repeat_byte(0x23)),
            vec![asset("ABND", 0x76, ether(1), ether(1))],
        );
    source.fail(SourceCall::Pools);

    let cycle = refresh_cycle(&source, ExporterConfig::default());
    assert!(run_cycle(&cycle).await.is_err());
    assert!(samples_with(&render(), r#"id="23""#).is_empty());

    // the next cycle proceeds on its own
    source.recover();
    run_cycle(&cycle).await?;
    assert!(!samples_with(&render(), r#"id="23""#).is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_cycles_are_idempotent() -> Result<()> {
    let comptroller = Address::repeat_byte(0x31);
    let mut market = asset("IDEM", 0x77, ether(12), ether(3));
    market.total_borrow = ether(5);
    market.borrow_rate_per_block = U256::from(1_000_000_000u64);
    let source = InMemorySource::default()
        .with_eth_usd(1800.0)
        .with_score(31, PoolScore::new(72.0))
        .with_pool(Pool::new(31, comptroller), vec![market.clone()])
        .with_user(comptroller, UserHealthRecord::new(Address::repeat_byte(1), ether(1)), ether(1))
        .with_reserves(market.ctoken, ether(2), ether(1))
        .with_events(market.ctoken, ["LiquidateBorrow"]);
    let cycle = refresh_cycle(&source, ExporterConfig::default());

    // rendering order is not stable between scrapes
    run_cycle(&cycle).await?;
    let first = samples_with(&render(), r#"id="31""#).into_iter().sorted().collect::<Vec<_>>();

    sleep(CONFIRM_DELAY).await;
    run_cycle(&cycle).await?;
    let second = samples_with(&render(), r#"id="31""#).into_iter().sorted().collect::<Vec<_>>();

    assert!(first.len() >= 10, "{first:?}");
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn later_values_overwrite_earlier_ones() -> Result<()> {
    let comptroller = Address::repeat_byte(0x32);
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(32, comptroller), vec![asset("LWW", 0x78, ether(1), ether(1))]);
    let cycle = refresh_cycle(&source, ExporterConfig::default());

    run_cycle(&cycle).await?;
    source.replace_assets(comptroller, vec![asset("LWW", 0x78, ether(2), ether(1))]);
    run_cycle(&cycle).await?;

    assert_eq!(
        sample(&render(), r#"fuse_pool_assets_supply_amount{id="32",symbol="LWW"}"#),
        Some(2.0)
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn score_and_leverage_are_refreshed() -> Result<()> {
    let comptroller = Address::repeat_byte(0x33);
    let borrower = |byte| UserHealthRecord::new(Address::repeat_byte(byte), ether(1));
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_score(33, PoolScore::new(91.5))
        .with_pool(Pool::new(33, comptroller), vec![])
        .with_user(comptroller, borrower(1), ether(1) / U256::from(2u64))
        .with_user(comptroller, borrower(2), ether(1) + ether(1) / U256::from(20u64))
        .with_user(comptroller, borrower(3), ether(1) + ether(1) / U256::from(20u64));

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert_eq!(sample(&rendered, r#"fuse_pool_rss{id="33"}"#), Some(91.5));
    assert_eq!(sample(&rendered, r#"fuse_userLeverage{id="33",level="liquidatable"}"#), Some(1.0));
    assert_eq!(sample(&rendered, r#"fuse_userLeverage{id="33",level="at_risk"}"#), Some(2.0));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dust_borrowers_are_ignored_when_enabled() -> Result<()> {
    let comptroller = Address::repeat_byte(0x34);
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(34, comptroller), vec![])
        .with_user(
            comptroller,
            UserHealthRecord::new(Address::repeat_byte(1), U256::from(1_000u64)),
            ether(1) / U256::from(2u64),
        )
        .with_user(
            comptroller,
            UserHealthRecord::new(Address::repeat_byte(2), ether(1)),
            ether(1) / U256::from(2u64),
        );

    run_cycle(&refresh_cycle(&source, ExporterConfig::default().with_dust_filter(true))).await?;

    assert_eq!(
        sample(&render(), r#"fuse_userLeverage{id="34",level="liquidatable"}"#),
        Some(1.0)
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reserves_and_fees_are_priced() -> Result<()> {
    let market = asset("RSV", 0x79, ether(1), ether(2));
    let source = InMemorySource::default()
        .with_eth_usd(1500.0)
        .with_pool(Pool::new(35, Address::repeat_byte(0x35)), vec![market.clone()])
        .with_reserves(market.ctoken, ether(4), ether(1));

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    let value = |gauge: &str| sample(&rendered, &format!(r#"{gauge}{{id="35",symbol="RSV"}}"#));
    assert_eq!(value("fuse_pool_assets_reserves_amount"), Some(4.0));
    assert_eq!(value("fuse_pool_assets_reserves_usd"), Some(12_000.0));
    assert_eq!(value("fuse_pool_assets_fees_amount"), Some(1.0));
    assert_eq!(value("fuse_pool_assets_fees_usd"), Some(3_000.0));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn staking_position_is_exported_unlabeled() -> Result<()> {
    let market = asset("SUSHI", 0x7a, ether(1), ether(1) / U256::from(1000u64));
    let staking = StakingConfig {
        token: market.underlying_token,
        contract: Address::repeat_byte(0xcc),
        account: Address::repeat_byte(0xdd),
        pool_id: U256::from(1u64),
    };
    let source = InMemorySource::default()
        .with_eth_usd(2000.0)
        .with_pool(Pool::new(36, Address::repeat_byte(0x36)), vec![market])
        .with_staking(ether(500), ether(10));

    run_cycle(&refresh_cycle(&source, ExporterConfig::default().with_staking(Some(staking))))
        .await?;

    let rendered = render();
    assert_eq!(sample(&rendered, "fuse_staking_deposited_amount"), Some(500.0));
    assert_eq!(sample(&rendered, "fuse_staking_deposited_usd"), Some(1000.0));
    assert_eq!(sample(&rendered, "fuse_staking_unclaimed_amount"), Some(10.0));
    assert_eq!(sample(&rendered, "fuse_staking_unclaimed_usd"), Some(20.0));

    Ok(())
}
