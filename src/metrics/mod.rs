//! Prometheus recorder, exposition service and the exported gauges.

mod gauges;
pub use gauges::{FuseGauge, describe_gauges};

mod transport;
pub use transport::TraceLayer;

use crate::constants::RECORDER_UPKEEP_INTERVAL;
use futures_util::{FutureExt, TryFutureExt};
use http::header::CONTENT_TYPE;
use jsonrpsee::server::{HttpBody, HttpRequest, HttpResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use metrics_process::Collector;
use std::{future::Future, pin::Pin, sync::Mutex};
use tower::Service;
use tower_http::BoxError;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Installs a Prometheus recorder as the global metrics recorder, returning a handle.
///
/// Subsequent calls return the handle of the recorder installed by the first one. Every
/// [`FuseGauge`] and process metric is described on installation.
///
/// # Panics
///
/// This will panic if another recorder was already set as the global metrics recorder.
pub fn setup_recorder() -> PrometheusHandle {
    static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

    let mut lock = HANDLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(handle) = &*lock {
        return handle.clone();
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).expect("could not set metrics recorder");
    describe_gauges();
    Collector::default().describe();

    *lock = Some(handle.clone());

    handle
}

/// Spawns a task sampling process metrics and running recorder upkeep on a fixed interval.
///
/// Process metrics (CPU time, resident memory, open file descriptors, start time) are sampled
/// right away, then before every upkeep.
pub fn spawn_upkeep(handle: PrometheusHandle) {
    let collector = Collector::default();
    tokio::spawn(async move {
        loop {
            collector.collect();
            tokio::time::sleep(RECORDER_UPKEEP_INTERVAL).await;
            handle.run_upkeep();
        }
    });
}

/// A Tower service that renders Prometheus metrics at `/metrics`.
///
/// Rendering reads the current samples without coordinating with writers, so a scrape may mix
/// values from different refresh cycles.
#[derive(Clone)]
#[must_use]
pub struct MetricsService<S> {
    inner: S,
    recorder: PrometheusHandle,
}

impl<S> MetricsService<S> {
    /// Create a new metrics service with the given recorder handle.
    pub fn new(inner: S, recorder: PrometheusHandle) -> Self {
        Self { inner, recorder }
    }
}

impl<S, B> Service<HttpRequest<B>> for MetricsService<S>
where
    S: Service<HttpRequest, Response = HttpResponse>,
    S::Response: 'static,
    S::Error: Into<BoxError> + 'static,
    S::Future: Send + 'static,
    B: http_body::Body<Data = alloy::primitives::bytes::Bytes> + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    #[inline]
    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: HttpRequest<B>) -> Self::Future {
        if req.method() == http::Method::GET && req.uri().path() == "/metrics" {
            let handle = self.recorder.clone();

            return async move {
                HttpResponse::builder()
                    .header(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)
                    .body(handle.render().into())
                    .map_err(Into::into)
            }
            .boxed();
        }

        let req = req.map(HttpBody::new);
        self.inner.call(req).map_err(Into::into).boxed()
    }
}

impl<S> std::fmt::Debug for MetricsService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsService").finish_non_exhaustive()
    }
}
