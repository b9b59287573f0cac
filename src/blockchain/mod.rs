//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ContractCallRequest (JSON parameters)
//!     → codec (schema-directed encoding)
//!     → TransactionPayload
//!     → gateway.rs / bridge.rs (wallet signs and submits)
//!     → transaction.rs (poll until finalized, interpret outcome)
//!
//! read-only call
//!     → invoke.rs → gateway.rs → codec (decode return value)
//! ```
//!
//! # Constraints
//! - Keys never leave the wallet; this crate only sees account addresses
//! - Every RPC call has a configurable timeout
//! - Submission is never retried; only "not yet finalized" is polled again

pub mod bridge;
pub mod client;
pub mod gateway;
pub mod invoke;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use bridge::JsonRpcWallet;
pub use client::JsonRpcGateway;
pub use gateway::{ChainGateway, WalletGateway};
pub use invoke::{invoke, invoke_raw};
pub use transaction::{PollPolicy, TransactionLifecycle};
pub use types::{
    ChainError, ContractAddress, InvokeError, LifecycleError, TransactionHandle,
    TransactionOutcome, TransactionPayload,
};
pub use wallet::{WalletEvent, WalletEvents, WalletProvider, WalletSubscription};
