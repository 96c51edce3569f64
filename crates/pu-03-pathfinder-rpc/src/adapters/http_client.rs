//! reqwest-based reload client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{interpret_body, JsonRpcRequest, ReloadParams, ReloadResponse, DEFAULT_RELOAD_METHOD};
use crate::error::ReloadError;
use crate::ports::GraphReloader;

/// JSON-RPC client for the pathfinder. One POST per reload, no retries.
pub struct PathfinderRpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    method: String,
    request_id: AtomicU64,
}

impl PathfinderRpcClient {
    /// Client with the default reload method and no request timeout.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, ReloadError> {
        Self::with_options(rpc_url, DEFAULT_RELOAD_METHOD, None)
    }

    pub fn with_options(
        rpc_url: impl Into<String>,
        method: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ReloadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(ReloadError::ClientBuild)?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            method: method.into(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

#[async_trait]
impl GraphReloader for PathfinderRpcClient {
    async fn reload(&self, snapshot_path: &str) -> Result<ReloadResponse, ReloadError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            id,
            jsonrpc: "2.0",
            method: &self.method,
            params: ReloadParams {
                file: snapshot_path,
            },
        };

        debug!(id, method = %self.method, file = snapshot_path, "Sending reload request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ReloadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response = interpret_body(body).map_err(|error| ReloadError::Rpc {
            code: error.code,
            message: error.message,
        })?;

        info!(body = %response.body, "Pathfinder reload response");
        Ok(response)
    }
}
