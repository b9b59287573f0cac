//! Parameter codec subsystem.
//!
//! # Data Flow
//! ```text
//! schema_base64 (config, binary versioned module schema)
//!     → schema.rs (ModuleSchema, loaded once, shared via Arc)
//!
//! JSON parameters
//!     → encode.rs (schema-directed binary serialization)
//!     → contract parameter bytes
//!
//! return value bytes
//!     → decode.rs (schema-directed binary deserialization)
//!     → JSON value → typed T via serde
//! ```
//!
//! # Design Decisions
//! - JSON is the application-level representation of parameters
//! - Wire formats come from `concordium-contracts-common` schema types
//! - Encoding and decoding are pure functions of (schema, input)

pub mod decode;
pub mod encode;
pub mod schema;

use thiserror::Error;

pub use decode::{decode_return_value, decode_value};
pub use encode::{encode_init_parameters, encode_parameters, encode_value};
pub use concordium_contracts_common::schema::Type as SchemaType;
pub use schema::{ModuleSchema, SharedSchema};

/// Errors raised while translating between JSON parameters and bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Parameters do not match the declared shape.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Bytes are malformed or do not fit the requested type.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The schema has no entry for the contract.
    #[error("Contract '{0}' not found in schema")]
    UnknownContract(String),

    /// The contract has no entry for the method.
    #[error("Method '{contract}.{method}' not found in schema")]
    UnknownMethod { contract: String, method: String },

    /// The schema document itself could not be read.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
