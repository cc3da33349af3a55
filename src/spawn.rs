//! Exporter spawn utilities.
use crate::{
    cli::Args,
    config::ExporterConfig,
    metrics::{self, MetricsService, TraceLayer},
    scheduler::Scheduler,
    source::{DataSource, FuseSource, PriceFeed, RssClient},
    status::{Status, StatusApiServer},
};
use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::ClientBuilder,
    transports::layers::RetryBackoffLayer,
};
use eyre::Context;
use http::header;
use jsonrpsee::server::{Server, ServerHandle, middleware::http::ProxyGetRequestLayer};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::task::JoinHandle;
use tower::{ServiceBuilder, layer::layer_fn};
use tower_http::cors::{AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// [`RetryBackoffLayer`] used for the chain provider.
///
/// We are allowing max 10 retries with a backoff of 800ms. The CU/s is set to max value to avoid
/// any throttling.
const RETRY_LAYER: RetryBackoffLayer = RetryBackoffLayer::new(10, 800, u64::MAX);

/// Context returned once the exporter is launched.
#[derive(Debug)]
pub struct ExporterHandle {
    /// The socket address to which the server is bound.
    pub local_addr: SocketAddr,
    /// Handle to the HTTP server.
    pub server: ServerHandle,
    /// Metrics collector handle.
    pub metrics: PrometheusHandle,
    /// Handle to the scheduler loop.
    pub scheduler: JoinHandle<()>,
}

impl ExporterHandle {
    /// Returns the url to the http server
    pub fn http_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stops the scheduler and the server.
    pub fn stop(&self) {
        self.scheduler.abort();
        let _ = self.server.stop();
    }
}

/// Attempts to spawn the exporter using CLI arguments and a configuration file.
pub async fn try_spawn_with_args<P: AsRef<Path>>(
    args: Args,
    config_path: P,
) -> eyre::Result<ExporterHandle> {
    let config = if !config_path.as_ref().exists() {
        let config = args.merge_exporter_config(ExporterConfig::default());
        config.save_to_file(&config_path).wrap_err_with(|| {
            format!("failed to write config file: {}", config_path.as_ref().display())
        })?;
        config
    } else {
        // File exists: load and override with CLI values.
        args.merge_exporter_config(ExporterConfig::load_from_file(&config_path)?)
    };

    let provider = ClientBuilder::default()
        .layer(TraceLayer)
        .layer(RETRY_LAYER.clone())
        .connect(config.upstream.endpoint.as_str())
        .await
        .map(|client| ProviderBuilder::new().connect_client(client).erased())
        .wrap_err("failed to connect to the chain")?;

    let source = fuse_source(&config, provider)?;

    try_spawn(config, source).await
}

/// Creates the Fuse [`DataSource`] described by `config`.
pub fn fuse_source(config: &ExporterConfig, provider: DynProvider) -> eyre::Result<DataSource> {
    let client = reqwest::Client::new();

    let price = if let Some(price) = config.upstream.constant_eth_usd {
        warn!("Setting a constant ETH price: {price}. Should not be used in production!");
        PriceFeed::Constant(price)
    } else {
        PriceFeed::coingecko(client.clone(), &config.upstream.coingecko_url)?
    };
    let rss = RssClient::new(client, &config.upstream.rss_url)?;

    Ok(DataSource::fuse(FuseSource::new(provider, config.upstream.lens, price, rss)))
}

/// Spawns the exporter using the provided [`ExporterConfig`] and [`DataSource`].
///
/// Fails before starting anything if the configuration is invalid.
pub async fn try_spawn(config: ExporterConfig, source: DataSource) -> eyre::Result<ExporterHandle> {
    config.validate()?;
    let config = Arc::new(config);

    // setup metrics recorder
    let metrics = metrics::setup_recorder();
    metrics::spawn_upkeep(metrics.clone());

    // start refresh cycles
    let scheduler = Scheduler::new(source, config.clone()).spawn();

    // http layers
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::any())
        .allow_origin(AllowOrigin::any())
        .allow_headers([header::CONTENT_TYPE]);
    let handle = metrics.clone();
    let exposition = layer_fn(move |service| MetricsService::new(service, handle.clone()));

    // start server
    let server = Server::builder()
        .http_only()
        .set_http_middleware(
            ServiceBuilder::new()
                .layer(cors)
                .layer(ProxyGetRequestLayer::new("/status", "status")?)
                .layer(exposition),
        )
        .build((config.server.address, config.server.port))
        .await
        .wrap_err_with(|| {
            format!("failed to bind {}:{}", config.server.address, config.server.port)
        })?;
    let addr = server.local_addr()?;
    info!(%addr, "Started fuse exporter");
    info!("Reading pools from lens {}", config.upstream.lens);

    Ok(ExporterHandle {
        local_addr: addr,
        server: server.start(Status::new().into_rpc()),
        metrics,
        scheduler,
    })
}
