//! Wallet provider abstraction.
//!
//! The wallet holds the user's keys. This client never sees them: it asks
//! the wallet to connect, to produce identity proofs, and to sign and send
//! transactions. Account and chain changes arrive as [`WalletEvent`]s.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::blockchain::types::{ChainResult, TransactionHandle, TransactionPayload};
use crate::identity::{IdProofOutput, IdStatement};

/// Events buffered per subscriber before the oldest are dropped.
const EVENT_BUFFER: usize = 32;

/// Errors reported by a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The user (or the wallet) declined the request.
    #[error("Wallet rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet communication failed: {0}")]
    Rpc(String),
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Change notifications emitted by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountChanged(String),
    AccountDisconnected(String),
    ChainChanged(String),
}

/// Signing and identity operations delegated to an external wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect and return the selected account address.
    async fn connect(&self) -> WalletResult<String>;

    /// Ask the wallet to prove `statement` for `account`, bound to `challenge`.
    async fn request_id_proof(
        &self,
        account: &str,
        statement: &IdStatement,
        challenge: &str,
    ) -> WalletResult<IdProofOutput>;

    /// Sign `payload` with `account` and submit it.
    async fn send_transaction(
        &self,
        account: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle>;

    /// Listen for account and chain changes.
    fn subscribe(&self) -> WalletSubscription;
}

#[async_trait]
impl<W: WalletProvider + ?Sized> WalletProvider for Arc<W> {
    async fn connect(&self) -> WalletResult<String> {
        (**self).connect().await
    }

    async fn request_id_proof(
        &self,
        account: &str,
        statement: &IdStatement,
        challenge: &str,
    ) -> WalletResult<IdProofOutput> {
        (**self).request_id_proof(account, statement, challenge).await
    }

    async fn send_transaction(
        &self,
        account: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        (**self).send_transaction(account, payload).await
    }

    fn subscribe(&self) -> WalletSubscription {
        (**self).subscribe()
    }
}

/// Fan-out hub for wallet events.
#[derive(Debug, Clone)]
pub struct WalletEvents {
    tx: broadcast::Sender<WalletEvent>,
}

impl WalletEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    /// Deliver `event` to every live subscription. Events published with no
    /// subscriber are discarded.
    pub fn publish(&self, event: WalletEvent) {
        tracing::debug!(?event, listeners = self.tx.receiver_count(), "Wallet event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> WalletSubscription {
        WalletSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for WalletEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration for wallet events. Dropping it unsubscribes.
#[derive(Debug)]
pub struct WalletSubscription {
    rx: broadcast::Receiver<WalletEvent>,
}

impl WalletSubscription {
    /// Next event, or `None` once the wallet is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Wallet subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
