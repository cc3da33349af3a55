use alloy::{
    rpc::json_rpc::{RequestPacket, ResponsePacket},
    transports::{TransportError, TransportFut},
};
use futures_util::FutureExt;
use opentelemetry::trace::SpanKind;
use tower::{Layer, Service};
use tracing::{Instrument, Level, field, span};

/// A layer that wraps upstream JSON-RPC requests in client spans.
///
/// The span attributes adhere to the OpenTelemetry JSON-RPC conventions.
///
/// See:
/// - <https://opentelemetry.io/docs/specs/semconv/rpc/json-rpc/>
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceLayer;

impl<S> Layer<S> for TraceLayer {
    type Service = TraceTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceTransport { inner }
    }
}

/// A trace-instrumented transport.
#[derive(Debug, Clone)]
pub struct TraceTransport<S> {
    inner: S,
}

impl<S> Service<RequestPacket> for TraceTransport<S>
where
    S: Service<RequestPacket, Future = TransportFut<'static>, Error = TransportError>
        + Send
        + 'static
        + Clone,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let span = span!(
            Level::DEBUG,
            "upstream",
            otel.kind = ?SpanKind::Client,
            otel.name = field::Empty,
            rpc.jsonrpc.version = "2.0",
            rpc.system = "jsonrpc",
            rpc.method = field::Empty,
            rpc.batch_size = field::Empty,
        );

        match &request {
            RequestPacket::Single(req) => {
                span.record("otel.name", format!("fuse.upstream/{}", req.method()));
                span.record("rpc.method", req.method());
            }
            RequestPacket::Batch(reqs) => {
                span.record("otel.name", "fuse.upstream/batch");
                span.record("rpc.batch_size", reqs.len());
            }
        }

        self.inner.call(request).instrument(span).boxed()
    }
}
