//! The challenge → proof → signature handshake.

use crate::blockchain::wallet::WalletProvider;
use crate::identity::{eu_nationality, IdStatement, IdentityError, IdentityResult, VerifierClient};

/// Runs the identity handshake that yields a verifier signature for an
/// account. Each call is a fresh attempt; nothing is retried.
#[derive(Debug, Clone)]
pub struct IdentityProofClient {
    verifier: VerifierClient,
    statement: IdStatement,
}

impl IdentityProofClient {
    /// Prove EU nationality, the statement the auction verifier checks.
    pub fn new(verifier: VerifierClient) -> IdentityResult<Self> {
        Ok(Self::with_statement(verifier, eu_nationality()?))
    }

    pub fn with_statement(verifier: VerifierClient, statement: IdStatement) -> Self {
        Self {
            verifier,
            statement,
        }
    }

    pub fn statement(&self) -> &IdStatement {
        &self.statement
    }

    pub fn verifier(&self) -> &VerifierClient {
        &self.verifier
    }

    /// Obtain the verifier's signature over `account`.
    pub async fn obtain_signature<W>(&self, wallet: &W, account: &str) -> IdentityResult<String>
    where
        W: WalletProvider + ?Sized,
    {
        let challenge = self.verifier.get_challenge(account).await?;

        let proof = wallet
            .request_id_proof(account, &self.statement, &challenge)
            .await
            .map_err(|e| {
                tracing::info!(account, error = %e, "Identity proof denied");
                IdentityError::ProofDenied(e.to_string())
            })?;

        let signature = self.verifier.get_signature(&challenge, &proof).await?;
        tracing::info!(account, "Identity verified");
        Ok(signature)
    }
}
