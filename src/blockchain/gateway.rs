//! Chain gateway abstraction.
//!
//! The lifecycle and invocation clients only see this trait, so tests can
//! drive them with in-process stubs and production code with
//! [`JsonRpcGateway`](crate::blockchain::client::JsonRpcGateway).

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{
    ChainResult, InvokeContext, InvokeResult, TransactionHandle, TransactionPayload,
    TransactionStatus,
};
use crate::blockchain::wallet::WalletProvider;

/// Operations a remote ledger node exposes to this client.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Read-only call; never creates a transaction.
    async fn invoke_contract(&self, context: &InvokeContext) -> ChainResult<InvokeResult>;

    /// Submit a state-changing transaction signed by `sender`.
    async fn send_transaction(
        &self,
        sender: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle>;

    /// Current status of a submitted transaction; `None` if the handle is unknown.
    async fn get_transaction_status(
        &self,
        handle: &TransactionHandle,
    ) -> ChainResult<Option<TransactionStatus>>;
}

#[async_trait]
impl<G: ChainGateway + ?Sized> ChainGateway for Arc<G> {
    async fn invoke_contract(&self, context: &InvokeContext) -> ChainResult<InvokeResult> {
        (**self).invoke_contract(context).await
    }

    async fn send_transaction(
        &self,
        sender: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        (**self).send_transaction(sender, payload).await
    }

    async fn get_transaction_status(
        &self,
        handle: &TransactionHandle,
    ) -> ChainResult<Option<TransactionStatus>> {
        (**self).get_transaction_status(handle).await
    }
}

/// Gateway whose transactions are signed and sent by a wallet while reads
/// and status queries go to the chain node.
pub struct WalletGateway<W, G> {
    wallet: W,
    chain: G,
}

impl<W, G> WalletGateway<W, G> {
    pub fn new(wallet: W, chain: G) -> Self {
        Self { wallet, chain }
    }
}

#[async_trait]
impl<W: WalletProvider, G: ChainGateway> ChainGateway for WalletGateway<W, G> {
    async fn invoke_contract(&self, context: &InvokeContext) -> ChainResult<InvokeResult> {
        self.chain.invoke_contract(context).await
    }

    async fn send_transaction(
        &self,
        sender: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        self.wallet.send_transaction(sender, payload).await
    }

    async fn get_transaction_status(
        &self,
        handle: &TransactionHandle,
    ) -> ChainResult<Option<TransactionStatus>> {
        self.chain.get_transaction_status(handle).await
    }
}
