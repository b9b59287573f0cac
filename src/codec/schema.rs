//! Contract module schema.
//!
//! The schema is the versioned binary module schema emitted by the contract
//! build, stored base64-encoded in configuration. It lists, per contract, the
//! init parameter type and the parameter and return value types of every
//! receive method. It is read once and treated as immutable afterwards.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use concordium_contracts_common::schema::{Type, VersionedModuleSchema, VersionedSchemaError};
use std::sync::Arc;

use crate::codec::{CodecError, CodecResult};

/// Schema shared read-only across all call paths.
pub type SharedSchema = Arc<ModuleSchema>;

/// Schema for every contract in a deployed module.
#[derive(Debug, Clone)]
pub struct ModuleSchema {
    inner: VersionedModuleSchema,
}

impl ModuleSchema {
    /// Parse a versioned module schema from its binary form.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let inner = VersionedModuleSchema::new(bytes, &None)
            .map_err(|e| CodecError::InvalidSchema(format!("{:?}", e)))?;
        Ok(Self { inner })
    }

    /// Parse a schema stored as base64.
    pub fn from_base64(encoded: &str) -> CodecResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CodecError::InvalidSchema(format!("Invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn contains_contract(&self, contract: &str) -> bool {
        !matches!(
            self.inner.get_init_param_schema(contract),
            Err(VersionedSchemaError::NoContractInModule)
        )
    }

    /// Init parameter type; `None` when the contract declares none.
    pub fn init_parameter(&self, contract: &str) -> CodecResult<Option<Type>> {
        lookup(self.inner.get_init_param_schema(contract), contract, "init")
    }

    /// Parameter type of a receive method; `None` when it declares none.
    pub fn parameter(&self, contract: &str, method: &str) -> CodecResult<Option<Type>> {
        lookup(
            self.inner.get_receive_param_schema(contract, method),
            contract,
            method,
        )
    }

    /// Return value type of a receive method; `None` when it declares none.
    pub fn return_value(&self, contract: &str, method: &str) -> CodecResult<Option<Type>> {
        lookup(
            self.inner.get_receive_return_value_schema(contract, method),
            contract,
            method,
        )
    }
}

fn lookup(
    result: Result<Type, VersionedSchemaError>,
    contract: &str,
    method: &str,
) -> CodecResult<Option<Type>> {
    match result {
        Ok(ty) => Ok(Some(ty)),
        Err(VersionedSchemaError::NoContractInModule) => {
            Err(CodecError::UnknownContract(contract.to_string()))
        }
        Err(VersionedSchemaError::NoReceiveInContract) => Err(CodecError::UnknownMethod {
            contract: contract.to_string(),
            method: method.to_string(),
        }),
        // Entrypoint exists but declares no type of this kind.
        Err(_) => Ok(None),
    }
}
