//! Chain gateway over JSON-RPC.
//!
//! # Responsibilities
//! - Connect to the node's JSON-RPC endpoint (primary + failovers)
//! - Invoke contracts, submit transactions, query transaction status
//! - Handle timeouts and network errors gracefully

use async_trait::async_trait;
use serde_json::json;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::rpc::RpcTransport;
use crate::blockchain::types::{
    ChainResult, GatewayConfig, InvokeContext, InvokeResult, TransactionHandle,
    TransactionPayload, TransactionStatus,
};

/// JSON-RPC chain gateway with failover support.
#[derive(Clone)]
pub struct JsonRpcGateway {
    transport: RpcTransport,
    config: GatewayConfig,
}

impl JsonRpcGateway {
    /// Create a new gateway.
    ///
    /// Fails only when the primary URL is invalid; reachability is checked
    /// lazily on the first call.
    pub fn new(config: GatewayConfig) -> ChainResult<Self> {
        let transport = RpcTransport::new(
            &config.rpc_url,
            &config.failover_urls,
            config.rpc_timeout_secs,
        )?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = transport.endpoint_count() - 1,
            timeout_secs = config.rpc_timeout_secs,
            "Chain gateway initialized"
        );

        Ok(Self { transport, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl ChainGateway for JsonRpcGateway {
    async fn invoke_contract(&self, context: &InvokeContext) -> ChainResult<InvokeResult> {
        self.transport.call("invokeContract", context).await
    }

    async fn send_transaction(
        &self,
        sender: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        // Never fail over: a timed-out submission may still have landed.
        self.transport
            .call_primary(
                "sendTransaction",
                &json!({"sender": sender, "payload": payload}),
            )
            .await
    }

    async fn get_transaction_status(
        &self,
        handle: &TransactionHandle,
    ) -> ChainResult<Option<TransactionStatus>> {
        self.transport
            .call("getTransactionStatus", &json!({"transactionHash": handle}))
            .await
    }
}

impl std::fmt::Debug for JsonRpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcGateway")
            .field("rpc_url", &self.config.rpc_url)
            .field("failover_urls", &self.config.failover_urls.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
