//! Wallet bridge over JSON-RPC.
//!
//! The bridge is a local process fronting the user's wallet. Every request
//! may wait on user approval, so its timeout is configured separately from
//! the chain gateway's.
//!
//! Account and chain changes happen inside the wallet. The bridge queues
//! them and hands them out through its `events` method; an event pump polls
//! that queue and publishes into the wallet's [`WalletEvents`] hub.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::blockchain::rpc::RpcTransport;
use crate::blockchain::types::{ChainError, ChainResult, TransactionHandle, TransactionPayload};
use crate::blockchain::wallet::{
    WalletError, WalletEvent, WalletEvents, WalletProvider, WalletResult, WalletSubscription,
};
use crate::config::schema::WalletConfig;
use crate::identity::{IdProofOutput, IdStatement};
use crate::lifecycle::CancelToken;

/// A queued wallet notification, as the bridge reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum BridgeEvent {
    AccountChanged { account: String },
    AccountDisconnected { account: String },
    ChainChanged { chain: String },
}

impl From<BridgeEvent> for WalletEvent {
    fn from(event: BridgeEvent) -> Self {
        match event {
            BridgeEvent::AccountChanged { account } => WalletEvent::AccountChanged(account),
            BridgeEvent::AccountDisconnected { account } => {
                WalletEvent::AccountDisconnected(account)
            }
            BridgeEvent::ChainChanged { chain } => WalletEvent::ChainChanged(chain),
        }
    }
}

/// Wallet reached through a JSON-RPC bridge.
#[derive(Debug, Clone)]
pub struct JsonRpcWallet {
    transport: RpcTransport,
    events: WalletEvents,
    poll_interval: Duration,
}

impl JsonRpcWallet {
    pub fn new(config: &WalletConfig) -> ChainResult<Self> {
        let transport = RpcTransport::new(&config.bridge_url, &[], config.timeout_secs)?;
        tracing::info!(bridge_url = %config.bridge_url, "Wallet bridge configured");
        Ok(Self {
            transport,
            events: WalletEvents::new(),
            poll_interval: Duration::from_millis(config.event_poll_ms),
        })
    }

    /// Hub used to publish events observed outside of a request.
    pub fn events(&self) -> &WalletEvents {
        &self.events
    }

    /// Drain the bridge's event queue into the hub. Returns how many events
    /// were published.
    pub async fn poll_events(&self) -> WalletResult<usize> {
        let events: Vec<BridgeEvent> = self
            .transport
            .call_primary("events", &json!({}))
            .await
            .map_err(wallet_error)?;

        let count = events.len();
        for event in events {
            self.events.publish(event.into());
        }
        Ok(count)
    }

    /// Poll the bridge in the background until `cancel` fires or the last
    /// subscription is dropped. Subscribe before starting the pump.
    pub fn spawn_event_pump(&self, cancel: CancelToken) -> JoinHandle<()> {
        let wallet = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(wallet.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if wallet.events.listener_count() == 0 {
                    break;
                }
                if let Err(e) = wallet.poll_events().await {
                    tracing::warn!(error = %e, "Wallet event poll failed");
                }
            }
            tracing::debug!("Wallet event pump stopped");
        })
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn connect(&self) -> WalletResult<String> {
        let account: Option<String> = self
            .transport
            .call_primary("connect", &json!({}))
            .await
            .map_err(wallet_error)?;
        let account = account.ok_or(WalletError::NotConnected)?;

        tracing::info!(account = %account, "Wallet connected");
        self.events.publish(WalletEvent::AccountChanged(account.clone()));
        Ok(account)
    }

    async fn request_id_proof(
        &self,
        account: &str,
        statement: &IdStatement,
        challenge: &str,
    ) -> WalletResult<IdProofOutput> {
        let params = json!({
            "account": account,
            "statement": statement,
            "challenge": challenge,
        });
        self.transport
            .call_primary("requestIdProof", &params)
            .await
            .map_err(wallet_error)
    }

    async fn send_transaction(
        &self,
        account: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        let params = json!({ "account": account, "payload": payload });
        self.transport.call_primary("sendTransaction", &params).await
    }

    fn subscribe(&self) -> WalletSubscription {
        self.events.subscribe()
    }
}

/// A JSON-RPC error object from the bridge means the wallet declined.
fn wallet_error(e: ChainError) -> WalletError {
    match e {
        ChainError::Remote { message, .. } => WalletError::Rejected(message),
        other => WalletError::Rpc(other.to_string()),
    }
}
