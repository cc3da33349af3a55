//! Process status endpoint.
//!
//! Exposed over JSON-RPC as `status` and proxied to `GET /status`.

use crate::version::FUSE_EXPORTER_SHORT_VERSION;
use chrono::{DateTime, Utc};
use jsonrpsee::{
    core::{RpcResult, async_trait},
    proc_macros::rpc,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Process metadata returned by [`StatusApiServer::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExporterStatus {
    /// When the process started.
    pub last_restart: DateTime<Utc>,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
    /// Exporter version.
    pub version: String,
}

/// Status RPC namespace.
#[rpc(server)]
pub trait StatusApi {
    /// Returns the process start time, uptime and version.
    #[method(name = "status")]
    async fn status(&self) -> RpcResult<ExporterStatus>;
}

/// Implementation of [`StatusApiServer`].
#[derive(Debug, Clone)]
pub struct Status {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Status {
    /// Creates a [`Status`] reporting the current time as the last restart.
    pub fn new() -> Self {
        Self { started_at: Utc::now(), started: Instant::now() }
    }

    /// Returns the current status.
    pub fn snapshot(&self) -> ExporterStatus {
        ExporterStatus {
            last_restart: self.started_at,
            uptime_seconds: self.started.elapsed().as_secs(),
            version: FUSE_EXPORTER_SHORT_VERSION.to_string(),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusApiServer for Status {
    async fn status(&self) -> RpcResult<ExporterStatus> {
        Ok(self.snapshot())
    }
}
