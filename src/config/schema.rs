//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the auction
//! client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Reference module of the auction contract.
pub const DEFAULT_MODULE_REF: &str =
    "6054d082a164b637d739d0ef110aa43a3cb9dd2d612ca24a8c01f5c313daf318";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Chain node JSON-RPC settings.
    pub gateway: GatewayConfig,

    /// Wallet bridge settings.
    pub wallet: WalletConfig,

    /// Identity verifier settings.
    pub verifier: VerifierConfig,

    /// Target contract and its schema.
    pub contract: ContractConfig,

    /// Finalization polling.
    pub polling: PollingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:9095".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet bridge.
    pub bridge_url: String,

    /// Request timeout in seconds; covers time spent on user approval.
    pub timeout_secs: u64,

    /// Interval between polls of the bridge's event queue, in milliseconds.
    pub event_poll_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://localhost:9096".to_string(),
            timeout_secs: 120,
            event_poll_ms: 1000,
        }
    }
}

/// Identity verifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Base URL; endpoints are appended to it.
    pub url: String,

    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8020/api".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract name within the module.
    pub name: String,

    /// Deployed module reference, 64 hex characters.
    pub module_ref: String,

    /// Module schema, base64-encoded JSON.
    pub schema_base64: String,

    /// Ed25519 key the contract checks verifier signatures against, hex.
    pub verify_key: String,

    /// Energy budget for every state-changing call.
    pub max_energy: u64,

    /// Index of the current instance, if one exists.
    pub index: Option<u64>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            name: "dino_auction".to_string(),
            module_ref: DEFAULT_MODULE_REF.to_string(),
            schema_base64: String::new(),
            verify_key: String::new(),
            max_energy: 30_000,
            index: None,
        }
    }
}

/// Finalization polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay before every status query in milliseconds.
    pub interval_ms: u64,

    /// Give up after this many polls. Unbounded when absent.
    pub max_attempts: Option<u32>,

    /// Give up after this many seconds. Unbounded when absent.
    pub deadline_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: None,
            deadline_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
