//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use concordium_contracts_common::schema::{
    ContractV3, Fields, FunctionV2, ModuleV3, SizeLength, Type,
};
use concordium_contracts_common::to_bytes;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::Instant;

use auction_client::blockchain::types::{
    ChainError, ChainResult, InvokeContext, InvokeResult, TransactionHandle, TransactionPayload,
    TransactionStatus,
};
use auction_client::blockchain::wallet::{
    WalletError, WalletEvents, WalletProvider, WalletResult, WalletSubscription,
};
use auction_client::codec::ModuleSchema;
use auction_client::identity::{IdProofOutput, IdStatement};

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Start a simple mock backend that returns a fixed response.
pub async fn start_mock_backend(status: u16, response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (status, response.to_string()) }).await
}

/// Start a programmable mock backend; the handler sees each parsed request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);
                        let Some(request) = read_request(&mut reader).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

async fn read_request(reader: &mut BufReader<tokio::net::TcpStream>) -> Option<CapturedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).await.ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.ok()?;
    Some(CapturedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

pub fn rpc_result(result: Value) -> (u16, String) {
    (
        200,
        json!({"jsonrpc": "2.0", "id": "1", "result": result}).to_string(),
    )
}

pub fn rpc_error(code: i64, message: &str) -> (u16, String) {
    (
        200,
        json!({"jsonrpc": "2.0", "id": "1", "error": {"code": code, "message": message}})
            .to_string(),
    )
}

/// A valid account address with the given payload byte.
pub fn account(byte: u8) -> String {
    bs58::encode([byte; 32]).with_check_version(1).into_string()
}

fn token_id() -> Type {
    Type::ByteList(SizeLength::U8)
}

fn token_amount() -> Type {
    Type::ULeb128(10)
}

fn address() -> Type {
    Type::Enum(vec![
        ("Account".into(), Fields::Unnamed(vec![Type::AccountAddress])),
        ("Contract".into(), Fields::Unnamed(vec![Type::ContractAddress])),
    ])
}

fn named(fields: Vec<(&str, Type)>) -> Type {
    Type::Struct(Fields::Named(
        fields.into_iter().map(|(n, t)| (n.to_string(), t)).collect(),
    ))
}

fn function(parameter: Option<Type>, return_value: Option<Type>) -> FunctionV2 {
    FunctionV2 {
        parameter,
        return_value,
        error: None,
    }
}

/// Versioned binary schema of the dino_auction contract, as the build emits it.
pub fn auction_schema_bytes() -> Vec<u8> {
    let token_set = Type::Set(SizeLength::U32, Box::new(token_id()));
    let holder = named(vec![
        ("balances", Type::List(SizeLength::U32, Box::new(token_id()))),
        ("operators", Type::List(SizeLength::U32, Box::new(address()))),
    ]);
    let metadata = named(vec![
        ("url", Type::String(SizeLength::U16)),
        ("hash", Type::String(SizeLength::U16)),
    ]);

    let mut receive = BTreeMap::new();
    receive.insert(
        "view".to_string(),
        function(
            None,
            Some(named(vec![
                (
                    "state",
                    Type::List(
                        SizeLength::U32,
                        Box::new(Type::Pair(Box::new(address()), Box::new(holder))),
                    ),
                ),
                ("tokens", Type::List(SizeLength::U32, Box::new(token_id()))),
            ])),
        ),
    );
    receive.insert(
        "get_owner".to_string(),
        function(None, Some(Type::AccountAddress)),
    );
    receive.insert(
        "balanceOf".to_string(),
        function(
            Some(Type::List(
                SizeLength::U16,
                Box::new(named(vec![("token_id", token_id()), ("address", address())])),
            )),
            Some(Type::List(SizeLength::U16, Box::new(token_amount()))),
        ),
    );
    receive.insert(
        "mint".to_string(),
        function(
            Some(named(vec![
                ("tokens", token_set.clone()),
                ("signature", Type::ByteArray(64)),
            ])),
            None,
        ),
    );
    receive.insert(
        "burn".to_string(),
        function(Some(named(vec![("token_id", token_id())])), None),
    );
    receive.insert(
        "init_auction".to_string(),
        function(
            Some(named(vec![(
                "tokens",
                Type::Map(
                    SizeLength::U32,
                    Box::new(token_id()),
                    Box::new(Type::Pair(Box::new(metadata), Box::new(token_amount()))),
                ),
            )])),
            None,
        ),
    );
    receive.insert(
        "burn_auction".to_string(),
        function(Some(named(vec![("tokens", token_set)])), None),
    );

    let mut contracts = BTreeMap::new();
    contracts.insert(
        "dino_auction".to_string(),
        ContractV3 {
            init: Some(function(
                Some(named(vec![("verify_key", Type::ByteArray(32))])),
                None,
            )),
            receive,
            event: None,
        },
    );

    let mut bytes = vec![0xff, 0xff, 3];
    bytes.extend(to_bytes(&ModuleV3 { contracts }));
    bytes
}

/// Base64 form of the schema, as stored in configuration.
pub fn auction_schema_base64() -> String {
    STANDARD.encode(auction_schema_bytes())
}

pub fn auction_schema() -> ModuleSchema {
    ModuleSchema::from_bytes(&auction_schema_bytes()).unwrap()
}

/// In-process gateway replaying a script of status answers.
#[derive(Default)]
pub struct ScriptedGateway {
    pub statuses: Mutex<VecDeque<ChainResult<Option<TransactionStatus>>>>,
    pub invoke_results: Mutex<VecDeque<InvokeResult>>,
    pub submitted: Mutex<Vec<(String, TransactionPayload)>>,
    pub invoked: Mutex<Vec<InvokeContext>>,
    pub polls: Mutex<Vec<Instant>>,
    pub reject_submission: bool,
}

impl ScriptedGateway {
    pub fn with_statuses(statuses: Vec<Option<TransactionStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    pub fn push_invoke(&self, result: InvokeResult) {
        self.invoke_results.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, status: Option<TransactionStatus>) {
        self.statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn submissions(&self) -> Vec<(String, TransactionPayload)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl auction_client::blockchain::ChainGateway for ScriptedGateway {
    async fn invoke_contract(&self, context: &InvokeContext) -> ChainResult<InvokeResult> {
        self.invoked.lock().unwrap().push(context.clone());
        self.invoke_results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ChainError::Rpc("no scripted invoke result".into()))
    }

    async fn send_transaction(
        &self,
        sender: &str,
        payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        if self.reject_submission {
            return Err(ChainError::Remote {
                method: "sendTransaction".into(),
                code: -32000,
                message: "insufficient funds".into(),
            });
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((sender.to_string(), payload.clone()));
        Ok(TransactionHandle(format!("tx-{}", submitted.len())))
    }

    async fn get_transaction_status(
        &self,
        _handle: &TransactionHandle,
    ) -> ChainResult<Option<TransactionStatus>> {
        self.polls.lock().unwrap().push(Instant::now());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Some(pending())))
    }
}

pub fn pending() -> TransactionStatus {
    serde_json::from_value(json!({"status": "committed"})).unwrap()
}

pub fn finalized_success(events: Value) -> TransactionStatus {
    serde_json::from_value(json!({
        "status": "finalized",
        "outcomes": {"b1": {"energyCost": 1200, "result": {"outcome": "success", "events": events}}}
    }))
    .unwrap()
}

pub fn finalized_reject(reason: Value) -> TransactionStatus {
    serde_json::from_value(json!({
        "status": "finalized",
        "outcomes": {"b1": {"energyCost": 30000, "result": {"outcome": "reject", "rejectReason": reason}}}
    }))
    .unwrap()
}

/// Compressed generator of the credential group, a well-formed credential id.
pub const CREDENTIAL: &str = "97f1d3a73197d7942695638c4fa9ac0fc3688c4f9774b905a14e3a3f171bac586c55e83ff97a1aeffb3af00adb22c6bb";

/// Identity proof in the wallet's JSON form.
pub fn proof_json() -> Value {
    json!({
        "credential": CREDENTIAL,
        "proof": {"v": 0, "value": {"proofs": []}},
    })
}

/// Wallet that approves or denies every proof request.
pub struct StubWallet {
    pub account: String,
    pub deny_proofs: bool,
    pub events: WalletEvents,
    pub proof_requests: Mutex<Vec<(String, String)>>,
}

impl StubWallet {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            deny_proofs: false,
            events: WalletEvents::new(),
            proof_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn denying(account: &str) -> Self {
        Self {
            deny_proofs: true,
            ..Self::new(account)
        }
    }
}

#[async_trait]
impl WalletProvider for StubWallet {
    async fn connect(&self) -> WalletResult<String> {
        Ok(self.account.clone())
    }

    async fn request_id_proof(
        &self,
        account: &str,
        _statement: &IdStatement,
        challenge: &str,
    ) -> WalletResult<IdProofOutput> {
        self.proof_requests
            .lock()
            .unwrap()
            .push((account.to_string(), challenge.to_string()));
        if self.deny_proofs {
            return Err(WalletError::Rejected("user declined".into()));
        }
        Ok(serde_json::from_value(proof_json()).unwrap())
    }

    async fn send_transaction(
        &self,
        _account: &str,
        _payload: &TransactionPayload,
    ) -> ChainResult<TransactionHandle> {
        Err(ChainError::Rpc("stub wallet does not submit".into()))
    }

    fn subscribe(&self) -> WalletSubscription {
        self.events.subscribe()
    }
}
