use crate::e2e::{Environment, asset, ether, sample};
use alloy::primitives::Address;
use eyre::{Result, eyre};
use fuse_exporter::{
    config::ExporterConfig, scheduler::Task, source::InMemorySource, status::ExporterStatus,
    types::Pool,
};
use http::{StatusCode, header::CONTENT_TYPE};
use std::time::Duration;
use tokio::time::{sleep, timeout};

const SERIES: &str = r#"fuse_pool_assets_supply_usd{id="51",symbol="SRV"}"#;

#[tokio::test(flavor = "multi_thread")]
async fn serves_metrics_and_status() -> Result<()> {
    let source = InMemorySource::default().with_eth_usd(2500.0).with_pool(
        Pool::new(51, Address::repeat_byte(0x51)),
        vec![asset("SRV", 0x90, ether(2), ether(1))],
    );
    let config = ExporterConfig::default().with_interval(Some(Duration::from_secs(1)));
    let env = Environment::setup(source, config).await?;
    let client = reqwest::Client::new();
    let url = env.handle.http_url();

    // the first cycle starts right away, poll until its samples are visible
    let body = timeout(Duration::from_secs(10), async {
        loop {
            let response = client.get(format!("{url}/metrics")).send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .unwrap_or_default();
            assert!(content_type.starts_with("text/plain; version=0.0.4"), "{content_type}");

            let body = response.text().await?;
            if sample(&body, SERIES).is_some() {
                return Ok::<_, reqwest::Error>(body);
            }
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .map_err(|_| eyre!("no samples after 10s"))??;

    assert_eq!(sample(&body, SERIES), Some(5000.0));
    assert!(body.contains("# HELP fuse_pool_assets_supply_usd"));
    if cfg!(target_os = "linux") {
        assert!(body.contains("process_resident_memory_bytes"));
    }

    let status: ExporterStatus = client.get(format!("{url}/status")).send().await?.json().await?;
    assert!(!status.version.is_empty());
    assert!(status.uptime_seconds < 60);
    assert!(status.last_restart <= chrono::Utc::now());

    env.cleanup().await;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn status_uses_camel_case_keys() -> Result<()> {
    let env = Environment::setup(InMemorySource::default(), ExporterConfig::default()).await?;

    let status: serde_json::Value =
        reqwest::get(format!("{}/status", env.handle.http_url())).await?.json().await?;
    assert!(status["lastRestart"].is_string());
    assert!(status["uptimeSeconds"].is_u64());
    assert!(status["version"].is_string());

    env.cleanup().await;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_interval_is_refused() {
    let config = ExporterConfig::default().with_interval(Some(Duration::ZERO));
    assert!(Environment::setup(InMemorySource::default(), config).await.is_err());

    let config = ExporterConfig::default().with_task_interval(Task::Leverage, Duration::ZERO);
    assert!(Environment::setup(InMemorySource::default(), config).await.is_err());
}
