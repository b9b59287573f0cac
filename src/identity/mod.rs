//! Identity verification subsystem.
//!
//! # Data Flow
//! ```text
//! account
//!     → verifier.rs (GET /challenge)
//!     → wallet (zero-knowledge proof of the statement)
//!     → verifier.rs (POST /prove)
//!     → signature accepted by the contract's mint entrypoint
//! ```

pub mod flow;
pub mod statement;
pub mod verifier;

use thiserror::Error;

pub use flow::IdentityProofClient;
pub use statement::{eu_nationality, parse_statement, IdProof, IdProofOutput, IdStatement};
pub use verifier::VerifierClient;

/// Failures of the identity handshake. The user may retry the whole flow.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid identity statement: {0}")]
    Statement(String),

    #[error("Could not obtain challenge: {0}")]
    Challenge(String),

    /// The wallet declined or the holder lacks qualifying attributes.
    #[error("Identity proof denied: {0}")]
    ProofDenied(String),

    /// The verifier rejected the proof.
    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Verifier request failed: {0}")]
    Http(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
