//! Chain-specific types and error definitions.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::codec::{CodecError, ModuleSchema};

// Re-export GatewayConfig from config module to avoid duplication
pub use crate::config::schema::GatewayConfig;

/// Address of a contract instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractAddress {
    pub index: u64,
    pub subindex: u64,
}

impl ContractAddress {
    /// Address with subindex 0, the only subindex currently in use.
    pub fn new(index: u64) -> Self {
        Self { index, subindex: 0 }
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{}>", self.index, self.subindex)
    }
}

/// Native currency amount in micro units. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub u64);

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().map(Amount).map_err(de::Error::custom),
            Value::Number(n) => n
                .as_u64()
                .map(Amount)
                .ok_or_else(|| de::Error::custom("amount must be a non-negative integer")),
            other => Err(de::Error::custom(format!("invalid amount {}", other))),
        }
    }
}

/// Maximum energy a contract execution may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Energy(pub u64);

impl From<u64> for Energy {
    fn from(energy: u64) -> Self {
        Self(energy)
    }
}

/// Opaque identifier of a submitted transaction (its hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHandle(pub String);

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A state-changing call to a receive method. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallRequest {
    pub contract_address: ContractAddress,
    pub contract_name: String,
    pub method_name: String,
    pub parameters: Value,
    pub amount: Amount,
    pub energy_budget: Energy,
}

impl ContractCallRequest {
    /// Fully qualified entrypoint, `contract.method`.
    pub fn receive_name(&self) -> String {
        format!("{}.{}", self.contract_name, self.method_name)
    }
}

/// Creation of a new contract instance from a deployed module.
#[derive(Debug, Clone, PartialEq)]
pub struct InitContractRequest {
    pub module_ref: String,
    pub contract_name: String,
    pub parameters: Value,
    pub amount: Amount,
    pub energy_budget: Energy,
}

/// Payload handed to the gateway, with parameters already encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionPayload {
    #[serde(rename_all = "camelCase")]
    Update {
        amount: Amount,
        address: ContractAddress,
        receive_name: String,
        max_contract_execution_energy: Energy,
        /// Hex-encoded parameter bytes.
        parameter: String,
    },
    #[serde(rename_all = "camelCase")]
    InitContract {
        amount: Amount,
        module_ref: String,
        init_name: String,
        max_contract_execution_energy: Energy,
        /// Hex-encoded parameter bytes.
        parameter: String,
    },
}

impl TransactionPayload {
    /// Encode the request parameters against the schema and build an update payload.
    pub fn update(schema: &ModuleSchema, request: &ContractCallRequest) -> Result<Self, CodecError> {
        let bytes = crate::codec::encode_parameters(
            schema,
            &request.contract_name,
            &request.method_name,
            &request.parameters,
        )?;
        Ok(TransactionPayload::Update {
            amount: request.amount,
            address: request.contract_address,
            receive_name: request.receive_name(),
            max_contract_execution_energy: request.energy_budget,
            parameter: hex::encode(bytes),
        })
    }

    /// Encode the init parameters against the schema and build an init payload.
    pub fn init(schema: &ModuleSchema, request: &InitContractRequest) -> Result<Self, CodecError> {
        let bytes = crate::codec::encode_init_parameters(
            schema,
            &request.contract_name,
            &request.parameters,
        )?;
        Ok(TransactionPayload::InitContract {
            amount: request.amount,
            module_ref: request.module_ref.clone(),
            init_name: format!("init_{}", request.contract_name),
            max_contract_execution_energy: request.energy_budget,
            parameter: hex::encode(bytes),
        })
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionPayload::Update { .. } => "update",
            TransactionPayload::InitContract { .. } => "init",
        }
    }
}

/// Context of a read-only contract invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeContext {
    pub contract: ContractAddress,
    /// Fully qualified entrypoint, `contract.method`.
    pub method: String,
    /// Hex-encoded parameter bytes.
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoker: Option<String>,
}

/// Result of a read-only invocation as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum InvokeResult {
    #[serde(rename_all = "camelCase")]
    Success {
        /// Hex-encoded return value bytes.
        #[serde(default)]
        return_value: Option<String>,
        #[serde(default)]
        used_energy: u64,
    },
    #[serde(rename_all = "camelCase")]
    Failure {
        reason: RejectReason,
        #[serde(default)]
        used_energy: u64,
    },
}

/// Lifecycle stage reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatusKind {
    Received,
    Committed,
    Finalized,
}

/// Status of a submitted transaction; outcomes keyed by block hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub status: TransactionStatusKind,
    #[serde(default)]
    pub outcomes: Option<BTreeMap<String, TransactionSummary>>,
}

/// Outcome of a transaction in one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[serde(default)]
    pub energy_cost: Option<u64>,
    pub result: SummaryResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SummaryResult {
    Success {
        #[serde(default)]
        events: Vec<ContractEvent>,
    },
    Reject {
        #[serde(rename = "rejectReason")]
        reject_reason: RejectReason,
    },
}

/// Emitted by a successful contract initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInitializedEvent {
    pub address: ContractAddress,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub contract_version: u8,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub init_name: String,
    #[serde(rename = "ref", default)]
    pub module_ref: String,
}

/// Emitted by a successful contract update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractUpdatedEvent {
    pub address: ContractAddress,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub receive_name: String,
    #[serde(default)]
    pub events: Vec<String>,
}

/// An event attached to a successful outcome, keyed by its `tag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ContractEvent {
    ContractInitialized(ContractInitializedEvent),
    Updated(ContractUpdatedEvent),
    Other { tag: String, raw: Value },
}

impl TryFrom<Value> for ContractEvent {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let tag = value
            .get("tag")
            .and_then(Value::as_str)
            .ok_or("event without tag")?
            .to_string();
        match tag.as_str() {
            "ContractInitialized" => serde_json::from_value(value)
                .map(ContractEvent::ContractInitialized)
                .map_err(|e| e.to_string()),
            "Updated" => serde_json::from_value(value)
                .map(ContractEvent::Updated)
                .map_err(|e| e.to_string()),
            _ => Ok(ContractEvent::Other { tag, raw: value }),
        }
    }
}

impl From<ContractEvent> for Value {
    fn from(event: ContractEvent) -> Self {
        fn tagged<T: Serialize>(tag: &str, inner: T) -> Value {
            let mut value = serde_json::to_value(inner).unwrap_or(Value::Null);
            if let Value::Object(map) = &mut value {
                map.insert("tag".to_string(), Value::String(tag.to_string()));
            }
            value
        }
        match event {
            ContractEvent::ContractInitialized(e) => tagged("ContractInitialized", e),
            ContractEvent::Updated(e) => tagged("Updated", e),
            ContractEvent::Other { raw, .. } => raw,
        }
    }
}

/// Why the chain or a contract rejected a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RejectReason {
    /// The contract's receive logic rejected with its own code.
    RejectedReceive {
        reject_reason: i32,
        receive_name: Option<String>,
        contract_address: Option<ContractAddress>,
    },
    /// The contract's init logic rejected with its own code.
    RejectedInit { reject_reason: i32 },
    OutOfEnergy,
    RuntimeFailure,
    InvalidReceiveMethod,
    InvalidInitMethod,
    AmountTooLarge,
    /// Any other tag reported by the chain.
    Other { tag: String, detail: Value },
}

impl RejectReason {
    /// The chain's tag for this reason.
    pub fn tag(&self) -> &str {
        match self {
            RejectReason::RejectedReceive { .. } => "RejectedReceive",
            RejectReason::RejectedInit { .. } => "RejectedInit",
            RejectReason::OutOfEnergy => "OutOfEnergy",
            RejectReason::RuntimeFailure => "RuntimeFailure",
            RejectReason::InvalidReceiveMethod => "InvalidReceiveMethod",
            RejectReason::InvalidInitMethod => "InvalidInitMethod",
            RejectReason::AmountTooLarge => "AmountTooLarge",
            RejectReason::Other { tag, .. } => tag.as_str(),
        }
    }

    /// True when the contract's own logic rejected the call.
    pub fn is_contract_logic(&self) -> bool {
        matches!(
            self,
            RejectReason::RejectedReceive { .. } | RejectReason::RejectedInit { .. }
        )
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::RejectedReceive { reject_reason, .. }
            | RejectReason::RejectedInit { reject_reason } => {
                write!(f, "{}: {}", self.tag(), reject_reason)
            }
            _ => f.write_str(self.tag()),
        }
    }
}

impl From<Value> for RejectReason {
    fn from(value: Value) -> Self {
        let tag = value
            .get("tag")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let code = value
            .get("rejectReason")
            .and_then(Value::as_i64)
            .and_then(|c| i32::try_from(c).ok());
        match (tag.as_str(), code) {
            ("RejectedReceive", Some(reject_reason)) => RejectReason::RejectedReceive {
                reject_reason,
                receive_name: value
                    .get("receiveName")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                contract_address: value
                    .get("contractAddress")
                    .and_then(|a| serde_json::from_value(a.clone()).ok()),
            },
            ("RejectedInit", Some(reject_reason)) => RejectReason::RejectedInit { reject_reason },
            ("OutOfEnergy", _) => RejectReason::OutOfEnergy,
            ("RuntimeFailure", _) => RejectReason::RuntimeFailure,
            ("InvalidReceiveMethod", _) => RejectReason::InvalidReceiveMethod,
            ("InvalidInitMethod", _) => RejectReason::InvalidInitMethod,
            ("AmountTooLarge", _) => RejectReason::AmountTooLarge,
            _ => RejectReason::Other { tag, detail: value },
        }
    }
}

impl From<RejectReason> for Value {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::RejectedReceive {
                reject_reason,
                receive_name,
                contract_address,
            } => {
                let mut value = json!({"tag": "RejectedReceive", "rejectReason": reject_reason});
                if let Some(name) = receive_name {
                    value["receiveName"] = Value::String(name);
                }
                if let Some(address) = contract_address {
                    value["contractAddress"] = json!(address);
                }
                value
            }
            RejectReason::RejectedInit { reject_reason } => {
                json!({"tag": "RejectedInit", "rejectReason": reject_reason})
            }
            RejectReason::Other { detail, .. } => detail,
            other => json!({"tag": other.tag()}),
        }
    }
}

/// Terminal (or pending) result of a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Pending,
    Success { events: Vec<ContractEvent> },
    Rejected { reason: RejectReason },
    /// The poll policy gave up before finalization.
    TimedOut { attempts: u32 },
}

impl TransactionOutcome {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionOutcome::Pending => "pending",
            TransactionOutcome::Success { .. } => "success",
            TransactionOutcome::Rejected { .. } => "rejected",
            TransactionOutcome::TimedOut { .. } => "timed_out",
        }
    }

    /// Events of a successful outcome; anything else becomes an error.
    pub fn into_events(self) -> LifecycleResult<Vec<ContractEvent>> {
        match self {
            TransactionOutcome::Success { events } => Ok(events),
            TransactionOutcome::Rejected { reason } => Err(LifecycleError::Rejected(reason)),
            TransactionOutcome::TimedOut { attempts } => Err(LifecycleError::TimedOut(attempts)),
            TransactionOutcome::Pending => Err(LifecycleError::MissingOutcome),
        }
    }
}

/// Errors talking to a chain gateway.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport failure or failure on every endpoint.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The endpoint answered with a JSON-RPC error object.
    #[error("RPC call '{method}' failed ({code}): {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for gateway operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors driving a transaction to a terminal state.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Parameters did not match the schema; nothing was submitted.
    #[error(transparent)]
    Encoding(#[from] CodecError),

    /// The gateway refused the transaction before any handle existed.
    #[error("Transaction submission failed: {0}")]
    Submission(#[source] ChainError),

    /// The gateway no longer knows the handle.
    #[error("Transaction {0} is unknown to the gateway")]
    Lookup(TransactionHandle),

    /// A status query failed mid-poll.
    #[error("Status query failed: {0}")]
    Gateway(#[source] ChainError),

    /// Finalized without any outcome record.
    #[error("Finalized transaction has no outcome")]
    MissingOutcome,

    /// The poll was cancelled before a terminal state.
    #[error("Waiting for transaction was cancelled")]
    Cancelled,

    /// Chain rejected a transaction whose success was required.
    #[error("Transaction rejected: {0}")]
    Rejected(RejectReason),

    /// Poll policy exhausted before finalization.
    #[error("Transaction not finalized after {0} polls")]
    TimedOut(u32),

    /// Initialization succeeded without a `ContractInitialized` event.
    #[error("Initialization produced no ContractInitialized event")]
    MissingInitEvent,
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors from read-only invocations.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Encoding(CodecError),

    /// The gateway reported a failed invocation.
    #[error("{reason}")]
    Invocation { reason: RejectReason },

    #[error(transparent)]
    Decoding(CodecError),

    #[error(transparent)]
    Gateway(#[from] ChainError),
}
