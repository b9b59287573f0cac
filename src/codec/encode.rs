//! Schema-directed serialization of JSON parameters.

use concordium_contracts_common::schema::Type;
use serde_json::Value;

use crate::codec::schema::ModuleSchema;
use crate::codec::{CodecError, CodecResult};

/// Serialize the parameter of a receive method.
///
/// Methods that declare no parameter accept `null`, `{}` or `[]` and encode to
/// an empty byte string.
pub fn encode_parameters(
    schema: &ModuleSchema,
    contract: &str,
    method: &str,
    params: &Value,
) -> CodecResult<Vec<u8>> {
    encode_optional(schema.parameter(contract, method)?, params)
}

/// Serialize the init parameter of a contract.
pub fn encode_init_parameters(
    schema: &ModuleSchema,
    contract: &str,
    params: &Value,
) -> CodecResult<Vec<u8>> {
    encode_optional(schema.init_parameter(contract)?, params)
}

/// Serialize a single value of the given type.
pub fn encode_value(ty: &Type, value: &Value) -> CodecResult<Vec<u8>> {
    ty.serial_value(value)
        .map_err(|e| CodecError::Encoding(e.to_string()))
}

fn encode_optional(ty: Option<Type>, value: &Value) -> CodecResult<Vec<u8>> {
    match ty {
        Some(ty) => encode_value(&ty, value),
        None if is_empty(value) => Ok(Vec::new()),
        None => Err(CodecError::Encoding("method takes no parameter".into())),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
