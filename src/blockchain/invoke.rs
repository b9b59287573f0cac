//! Read-only contract invocation.
//!
//! An invocation runs a receive method against current state without
//! creating a transaction. One gateway round trip, no retries.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{ContractAddress, InvokeContext, InvokeError, InvokeResult};
use crate::codec::{decode_return_value, encode_parameters, CodecError, ModuleSchema};
use crate::observability::metrics;

/// Invoke `contract_name.method` on `address` and decode its return value.
pub async fn invoke<G, T>(
    gateway: &G,
    schema: &ModuleSchema,
    address: ContractAddress,
    contract_name: &str,
    method: &str,
    params: &Value,
) -> Result<T, InvokeError>
where
    G: ChainGateway + ?Sized,
    T: DeserializeOwned,
{
    let bytes = invoke_raw(gateway, schema, address, contract_name, method, params)
        .await?
        .ok_or_else(|| {
            metrics::record_invocation("decode_error");
            InvokeError::Decoding(CodecError::Decoding(format!(
                "{}.{} returned no value",
                contract_name, method
            )))
        })?;

    decode_return_value(schema, contract_name, method, &bytes).map_err(|e| {
        metrics::record_invocation("decode_error");
        InvokeError::Decoding(e)
    })
}

/// Invoke and return the raw return value bytes, if any.
pub async fn invoke_raw<G>(
    gateway: &G,
    schema: &ModuleSchema,
    address: ContractAddress,
    contract_name: &str,
    method: &str,
    params: &Value,
) -> Result<Option<Vec<u8>>, InvokeError>
where
    G: ChainGateway + ?Sized,
{
    let parameter =
        encode_parameters(schema, contract_name, method, params).map_err(InvokeError::Encoding)?;
    let context = InvokeContext {
        contract: address,
        method: format!("{}.{}", contract_name, method),
        parameter: hex::encode(parameter),
        invoker: None,
    };

    let result = match gateway.invoke_contract(&context).await {
        Ok(result) => result,
        Err(e) => {
            metrics::record_invocation("gateway_error");
            return Err(e.into());
        }
    };

    match result {
        InvokeResult::Success {
            return_value,
            used_energy,
        } => {
            tracing::debug!(
                contract = %address,
                method = %context.method,
                used_energy,
                "Invocation succeeded"
            );
            metrics::record_invocation("success");
            return_value
                .map(|hex_value| {
                    hex::decode(&hex_value).map_err(|e| {
                        InvokeError::Decoding(CodecError::Decoding(format!(
                            "return value is not hex: {}",
                            e
                        )))
                    })
                })
                .transpose()
        }
        InvokeResult::Failure { reason, .. } => {
            tracing::debug!(
                contract = %address,
                method = %context.method,
                reason = %reason,
                "Invocation failed"
            );
            metrics::record_invocation("failure");
            Err(InvokeError::Invocation { reason })
        }
    }
}
