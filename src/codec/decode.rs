//! Schema-directed deserialization of return values.

use concordium_contracts_common::schema::Type;
use concordium_contracts_common::Cursor;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::schema::ModuleSchema;
use crate::codec::{CodecError, CodecResult};

/// Deserialize the return value of a receive method into `T`.
///
/// Fails when the bytes are malformed, when bytes remain after the declared
/// type is read, or when the decoded JSON does not fit `T`.
pub fn decode_return_value<T: DeserializeOwned>(
    schema: &ModuleSchema,
    contract: &str,
    method: &str,
    bytes: &[u8],
) -> CodecResult<T> {
    let ty = schema
        .return_value(contract, method)?
        .ok_or_else(|| err(format!("{}.{} declares no return value", contract, method)))?;
    let value = decode_value(&ty, bytes)?;
    serde_json::from_value(value).map_err(|e| err(format!("unexpected shape: {}", e)))
}

/// Deserialize a complete byte string as a single value of the given type.
pub fn decode_value(ty: &Type, bytes: &[u8]) -> CodecResult<Value> {
    let mut cursor = Cursor::new(bytes);
    let value = ty
        .to_json(&mut cursor)
        .map_err(|_| err(format!("malformed value in {} bytes", bytes.len())))?;
    let remaining = bytes.len() - cursor.offset;
    if remaining != 0 {
        return Err(err(format!("{} trailing bytes", remaining)));
    }
    Ok(value)
}

fn err(msg: impl Into<String>) -> CodecError {
    CodecError::Decoding(msg.into())
}
