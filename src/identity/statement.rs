//! Identity statements and proofs.
//!
//! A statement lists claims about the holder's identity attributes. The
//! wallet proves them in zero knowledge; this crate only builds statements
//! and forwards proofs. Both use the chain's own identity types so that what
//! is sent to the wallet and the verifier is exactly what they parse.

use concordium_base::base::CredentialRegistrationID;
use concordium_base::common::Versioned;
use concordium_base::id::constants::{ArCurve, AttributeKind};
use concordium_base::id::id_proof_types::{Proof, Statement};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::identity::{IdentityError, IdentityResult};

/// ISO 3166-1 alpha-2 codes of the EU member states.
pub const EU_MEMBERS: [&str; 27] = [
    "AT", "BE", "BG", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT", "LV",
    "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE", "HR",
];

/// Conjunction of atomic claims over account credential attributes.
pub type IdStatement = Statement<ArCurve, AttributeKind>;

/// Zero-knowledge proof of an [`IdStatement`].
pub type IdProof = Proof<ArCurve, AttributeKind>;

/// Require the nationality to be one of the EU member states.
pub fn eu_nationality() -> IdentityResult<IdStatement> {
    parse_statement(json!([{
        "type": "AttributeInSet",
        "attributeTag": "nationality",
        "set": EU_MEMBERS,
    }]))
}

/// Parse a statement from its wallet JSON form.
pub fn parse_statement(value: serde_json::Value) -> IdentityResult<IdStatement> {
    serde_json::from_value(value).map_err(|e| IdentityError::Statement(e.to_string()))
}

/// Proof produced by the wallet, bound to the credential it was made for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdProofOutput {
    pub credential: CredentialRegistrationID,
    pub proof: Versioned<IdProof>,
}
