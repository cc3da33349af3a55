use crate::e2e::{asset, ether, refresh_cycle, render, run_cycle, sample, samples_with};
use alloy::primitives::Address;
use eyre::Result;
use fuse_exporter::{
    config::{EventMode, ExporterConfig},
    source::{InMemorySource, SourceCall},
    types::Pool,
};

#[tokio::test(start_paused = true)]
async fn liquidations_are_counted_by_default() -> Result<()> {
    let market = asset("LIQ", 0x80, ether(1), ether(1));
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(41, Address::repeat_byte(0x41)), vec![market.clone()])
        .with_events(market.ctoken, ["Mint", "LiquidateBorrow", "Borrow", "LiquidateBorrow"]);

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_liquidations{id="41",symbol="LIQ"}"#),
        Some(2.0)
    );
    assert!(
        samples_with(&rendered, r#"id="41""#)
            .iter()
            .all(|line| !line.starts_with("fuse_pool_assets_events"))
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn every_event_is_counted_in_all_mode() -> Result<()> {
    let market = asset("ALL", 0x81, ether(1), ether(1));
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(42, Address::repeat_byte(0x42)), vec![market.clone()])
        .with_events(market.ctoken, ["Mint", "Mint", "Redeem", "Mint", "Unknown"]);
    let config = ExporterConfig::default().with_event_mode(Some(EventMode::All));

    run_cycle(&refresh_cycle(&source, config)).await?;

    let rendered = render();
    let count = |event: &str| {
        sample(
            &rendered,
            &format!(r#"fuse_pool_assets_events{{id="42",symbol="ALL",event="{event}"}}"#),
        )
    };
    assert_eq!(count("Mint"), Some(3.0));
    assert_eq!(count("Redeem"), Some(1.0));
    assert_eq!(count("Unknown"), Some(1.0));
    assert_eq!(count("Borrow"), None);
    assert_eq!(sample(&rendered, r#"fuse_pool_assets_liquidations{id="42",symbol="ALL"}"#), None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_scan_keeps_sibling_assets() -> Result<()> {
    let broken = asset("BRKN", 0x82, ether(1), ether(1));
    let healthy = asset("HLTH", 0x83, ether(1), ether(1));
    let source = InMemorySource::default()
        .with_eth_usd(1.0)
        .with_pool(Pool::new(43, Address::repeat_byte(0x43)), vec![broken.clone(), healthy.clone()])
        .with_events(healthy.ctoken, ["LiquidateBorrow"]);
    source.fail_key(broken.ctoken);

    run_cycle(&refresh_cycle(&source, ExporterConfig::default())).await?;

    let rendered = render();
    assert_eq!(source.calls(SourceCall::AssetEvents), 2);
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_liquidations{id="43",symbol="HLTH"}"#),
        Some(1.0)
    );
    assert_eq!(sample(&rendered, r#"fuse_pool_assets_liquidations{id="43",symbol="BRKN"}"#), None);
    // market values of the failing asset are still written
    assert_eq!(
        sample(&rendered, r#"fuse_pool_assets_supply_amount{id="43",symbol="BRKN"}"#),
        Some(1.0)
    );

    Ok(())
}
