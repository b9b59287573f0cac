//! JSON-RPC 2.0 transport over HTTP with per-request timeout and failover.
//!
//! Shared by the chain gateway and the wallet bridge.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{ChainError, ChainResult};

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: &'a P,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC transport with an ordered list of endpoints.
#[derive(Clone)]
pub struct RpcTransport {
    http: reqwest::Client,
    /// Primary first, then failovers.
    endpoints: Vec<Url>,
    timeout_secs: u64,
}

impl RpcTransport {
    /// Create a transport. An invalid primary URL is an error; invalid
    /// failover URLs are skipped with a warning.
    pub fn new(primary: &str, failover: &[String], timeout_secs: u64) -> ChainResult<Self> {
        let primary_url: Url = primary
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL '{}': {}", primary, e)))?;
        let mut endpoints = vec![primary_url];

        for url_str in failover {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoints,
            timeout_secs,
        })
    }

    pub fn primary(&self) -> &Url {
        &self.endpoints[0]
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Call `method`, trying each endpoint in order until one answers.
    ///
    /// A JSON-RPC error object is a definitive answer and is returned without
    /// trying further endpoints.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> ChainResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let duration = Duration::from_secs(self.timeout_secs);
        for (i, url) in self.endpoints.iter().enumerate() {
            match timeout(duration, self.call_endpoint(url, method, params)).await {
                Ok(Ok(result)) => return decode(method, result),
                Ok(Err(e @ ChainError::Remote { .. })) => return Err(e),
                Ok(Err(e)) => {
                    tracing::warn!(endpoint_idx = i, method, error = %e, "RPC error, trying next endpoint");
                }
                Err(_) => {
                    tracing::warn!(endpoint_idx = i, method, "RPC timeout, trying next endpoint");
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All RPC endpoints failed for '{}'",
            method
        )))
    }

    /// Call `method` on the primary endpoint only.
    ///
    /// Used for non-idempotent calls such as transaction submission.
    pub async fn call_primary<P, R>(&self, method: &str, params: &P) -> ChainResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let duration = Duration::from_secs(self.timeout_secs);
        match timeout(duration, self.call_endpoint(self.primary(), method, params)).await {
            Ok(result) => decode(method, result?),
            Err(_) => Err(ChainError::Timeout(self.timeout_secs)),
        }
    }

    async fn call_endpoint<P: Serialize + Sync>(
        &self,
        url: &Url,
        method: &str,
        params: &P,
    ) -> ChainResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        };
        tracing::trace!(endpoint = %url, method, id = %request.id, "RPC request");

        let response = self
            .http
            .post(url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Rpc(format!(
                "Endpoint {} returned HTTP {}",
                url, status
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(ChainError::Remote {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result)
    }
}

fn decode<R: DeserializeOwned>(method: &str, result: Value) -> ChainResult<R> {
    serde_json::from_value(result)
        .map_err(|e| ChainError::InvalidResponse(format!("{}: {}", method, e)))
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("primary", &self.endpoints[0].as_str())
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
