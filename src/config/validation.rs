//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every endpoint URL parses
//! - Validate value ranges (interval > 0, energy > 0)
//! - Check that the schema decodes and describes the configured contract
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::codec::ModuleSchema;
use crate::config::schema::AppConfig;

/// A single semantic problem, tied to the offending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "gateway.rpc_url", &config.gateway.rpc_url);
    for (i, url) in config.gateway.failover_urls.iter().enumerate() {
        check_url(&mut errors, &format!("gateway.failover_urls[{}]", i), url);
    }
    check_url(&mut errors, "wallet.bridge_url", &config.wallet.bridge_url);
    check_url(&mut errors, "verifier.url", &config.verifier.url);

    if config.gateway.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("gateway.rpc_timeout_secs", "must be > 0"));
    }
    if config.wallet.timeout_secs == 0 {
        errors.push(ValidationError::new("wallet.timeout_secs", "must be > 0"));
    }
    if config.wallet.event_poll_ms == 0 {
        errors.push(ValidationError::new("wallet.event_poll_ms", "must be > 0"));
    }
    if config.verifier.timeout_secs == 0 {
        errors.push(ValidationError::new("verifier.timeout_secs", "must be > 0"));
    }
    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be > 0"));
    }
    if config.polling.max_attempts == Some(0) {
        errors.push(ValidationError::new("polling.max_attempts", "must be > 0 when set"));
    }

    let contract = &config.contract;
    if contract.name.is_empty() {
        errors.push(ValidationError::new("contract.name", "must not be empty"));
    }
    if contract.max_energy == 0 {
        errors.push(ValidationError::new("contract.max_energy", "must be > 0"));
    }
    check_hex32(&mut errors, "contract.module_ref", &contract.module_ref);
    check_hex32(&mut errors, "contract.verify_key", &contract.verify_key);

    match ModuleSchema::from_base64(&contract.schema_base64) {
        Ok(schema) => {
            if !schema.contains_contract(&contract.name) {
                errors.push(ValidationError::new(
                    "contract.schema_base64",
                    format!("schema has no contract '{}'", contract.name),
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new("contract.schema_base64", e.to_string())),
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn check_hex32(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.len() != 64 || hex::decode(value).is_err() {
        errors.push(ValidationError::new(field, "expected 64 hex characters"));
    }
}
