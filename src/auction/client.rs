//! High-level client for the auction contract.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::auction::cache::{ParticipationCache, ParticipationKey};
use crate::auction::types::{
    Address, AuctionBurnParams, AuctionInitParams, BalanceOfQuery, BurnParams, InitParams,
    MintParams, TokenId, ViewState,
};
use crate::auction::{AuctionError, AuctionResult};
use crate::blockchain::bridge::JsonRpcWallet;
use crate::blockchain::client::JsonRpcGateway;
use crate::blockchain::gateway::{ChainGateway, WalletGateway};
use crate::blockchain::invoke::invoke;
use crate::blockchain::transaction::{PollPolicy, TransactionLifecycle};
use crate::blockchain::types::{
    Amount, ContractAddress, ContractCallRequest, Energy, InitContractRequest,
    TransactionHandle, TransactionOutcome, TransactionPayload,
};
use crate::blockchain::wallet::WalletProvider;
use crate::codec::{CodecError, ModuleSchema, SharedSchema};
use crate::config::schema::{AppConfig, ContractConfig};
use crate::identity::{IdentityProofClient, VerifierClient};
use crate::lifecycle::CancelToken;

/// Client wired to the JSON-RPC gateway, wallet bridge and HTTP verifier.
pub type DefaultAuctionClient =
    AuctionClient<WalletGateway<Arc<JsonRpcWallet>, JsonRpcGateway>, JsonRpcWallet>;

/// Reads and mutates one auction contract instance.
///
/// `G` submits transactions and serves reads; `W` answers identity proof
/// requests and is usually the same wallet that signs inside `G`.
pub struct AuctionClient<G, W> {
    lifecycle: TransactionLifecycle<G>,
    wallet: Arc<W>,
    identity: IdentityProofClient,
    schema: SharedSchema,
    contract: ContractConfig,
    address: Option<ContractAddress>,
    cache: ParticipationCache,
    cancel: CancelToken,
}

impl DefaultAuctionClient {
    /// Build every collaborator from configuration.
    pub fn from_config(config: &AppConfig, cancel: CancelToken) -> AuctionResult<Self> {
        let schema = Arc::new(ModuleSchema::from_base64(&config.contract.schema_base64)?);
        let wallet = Arc::new(JsonRpcWallet::new(&config.wallet)?);
        let chain = JsonRpcGateway::new(config.gateway.clone())?;
        let verifier = VerifierClient::new(&config.verifier)?;

        Ok(AuctionClient::new(
            WalletGateway::new(wallet.clone(), chain),
            wallet,
            IdentityProofClient::new(verifier)?,
            schema,
            config.contract.clone(),
            PollPolicy::from(&config.polling),
        )
        .with_cancel(cancel))
    }
}

impl<G: ChainGateway, W: WalletProvider> AuctionClient<G, W> {
    pub fn new(
        gateway: G,
        wallet: Arc<W>,
        identity: IdentityProofClient,
        schema: SharedSchema,
        contract: ContractConfig,
        policy: PollPolicy,
    ) -> Self {
        let address = contract.index.map(ContractAddress::new);
        Self {
            lifecycle: TransactionLifecycle::new(gateway, policy),
            wallet,
            identity,
            schema,
            contract,
            address,
            cache: ParticipationCache::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Stop pending transaction waits when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Target a different contract instance.
    pub fn with_address(mut self, address: ContractAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn address(&self) -> AuctionResult<ContractAddress> {
        self.address.ok_or(AuctionError::NoContract)
    }

    pub fn cache(&self) -> &ParticipationCache {
        &self.cache
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Accounts with their holdings, and all auction tokens.
    pub async fn view(&self) -> AuctionResult<ViewState> {
        self.query("view", &Value::Null).await
    }

    /// Account that owns the contract instance.
    pub async fn owner(&self) -> AuctionResult<String> {
        self.query("get_owner", &Value::Null).await
    }

    /// Balances of `account` for `token`, one entry per query.
    pub async fn balance_of(&self, token: &TokenId, account: &str) -> AuctionResult<Vec<String>> {
        let queries = vec![BalanceOfQuery {
            token_id: token.clone(),
            address: Address::account(account),
        }];
        self.query("balanceOf", &to_json(&queries)?).await
    }

    /// Whether `account` takes part in the auction for `token`.
    ///
    /// `None` when the contract reports no balance at all. Results are
    /// cached until a mutating call on the same key.
    pub async fn is_participant(
        &self,
        token: &TokenId,
        account: &str,
    ) -> AuctionResult<Option<bool>> {
        let key = ParticipationKey::new(self.address()?, account, token);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let balances = self.balance_of(token, account).await?;
        let participating = balances.first().map(|balance| balance != "0");
        self.cache.insert(key, participating);
        Ok(participating)
    }

    /// Prove identity to the verifier, then mint a participation token.
    pub async fn enter_auction(
        &self,
        token: &TokenId,
        account: &str,
    ) -> AuctionResult<TransactionOutcome> {
        let address = self.address()?;
        let signature = self
            .identity
            .obtain_signature(self.wallet.as_ref(), account)
            .await?;

        let params = MintParams {
            tokens: vec![token.clone()],
            signature,
        };
        let result = self.update(address, account, "mint", &params).await;
        self.cache
            .invalidate(&ParticipationKey::new(address, account, token));
        result
    }

    /// Burn the caller's participation token.
    pub async fn leave_auction(
        &self,
        token: &TokenId,
        account: &str,
    ) -> AuctionResult<TransactionOutcome> {
        let address = self.address()?;
        let params = BurnParams {
            token_id: token.clone(),
        };
        let result = self.update(address, account, "burn", &params).await;
        self.cache
            .invalidate(&ParticipationKey::new(address, account, token));
        result
    }

    /// Owner only: open an auction for `token` with `quantity` supply.
    pub async fn init_auction(
        &self,
        token: &TokenId,
        quantity: u64,
        account: &str,
    ) -> AuctionResult<TransactionOutcome> {
        let params = AuctionInitParams::single(token.clone(), quantity);
        self.update(self.address()?, account, "init_auction", &params)
            .await
    }

    /// Owner only: close the auction for `token`.
    pub async fn burn_auction(
        &self,
        token: &TokenId,
        account: &str,
    ) -> AuctionResult<TransactionOutcome> {
        let address = self.address()?;
        let params = AuctionBurnParams {
            tokens: vec![token.clone()],
        };
        let result = self.update(address, account, "burn_auction", &params).await;
        self.cache.invalidate_contract(address);
        result
    }

    /// Create a new contract instance owned by `account`.
    pub async fn initialize_contract(&self, account: &str) -> AuctionResult<ContractAddress> {
        let params = InitParams {
            verify_key: self.contract.verify_key.clone(),
        };
        let request = InitContractRequest {
            module_ref: self.contract.module_ref.clone(),
            contract_name: self.contract.name.clone(),
            parameters: to_json(&params)?,
            amount: Amount::default(),
            energy_budget: Energy(self.contract.max_energy),
        };
        let payload = TransactionPayload::init(&self.schema, &request)?;

        let event = self
            .lifecycle
            .initialize(account, &payload, &self.cancel)
            .await?;
        tracing::info!(contract = %event.address, owner = account, "Contract initialized");
        Ok(event.address)
    }

    /// Resume waiting on a transaction submitted earlier.
    pub async fn await_transaction(
        &self,
        handle: &TransactionHandle,
    ) -> AuctionResult<TransactionOutcome> {
        Ok(self.lifecycle.await_outcome(handle, &self.cancel).await?)
    }

    async fn query<T: DeserializeOwned>(&self, method: &str, params: &Value) -> AuctionResult<T> {
        Ok(invoke(
            self.lifecycle.gateway(),
            &self.schema,
            self.address()?,
            &self.contract.name,
            method,
            params,
        )
        .await?)
    }

    async fn update<P: Serialize>(
        &self,
        address: ContractAddress,
        account: &str,
        method: &str,
        params: &P,
    ) -> AuctionResult<TransactionOutcome> {
        let request = ContractCallRequest {
            contract_address: address,
            contract_name: self.contract.name.clone(),
            method_name: method.to_string(),
            parameters: to_json(params)?,
            amount: Amount::default(),
            energy_budget: Energy(self.contract.max_energy),
        };
        let payload = TransactionPayload::update(&self.schema, &request)?;

        let outcome = self
            .lifecycle
            .submit_and_await(account, &payload, &self.cancel)
            .await?;
        if let TransactionOutcome::Rejected { reason } = &outcome {
            tracing::warn!(
                method = %request.receive_name(),
                reason = %reason,
                contract_logic = reason.is_contract_logic(),
                "Update rejected"
            );
        }
        Ok(outcome)
    }
}

fn to_json<P: Serialize>(params: &P) -> AuctionResult<Value> {
    serde_json::to_value(params).map_err(|e| CodecError::Encoding(e.to_string()).into())
}
