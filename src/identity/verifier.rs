//! HTTP client for the identity verifier.
//!
//! # Endpoints
//! - `GET  {url}/challenge?address=<account>` → `{"challenge": "<hex>"}`
//! - `GET  {url}/statement` → statement JSON (possibly as a JSON string)
//! - `POST {url}/prove` with `{challenge, proof}` → signature as a JSON string
//!
//! Error responses carry `{"code": u16, "message": String}`.

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::config::schema::VerifierConfig;
use crate::identity::{parse_statement, IdProofOutput, IdStatement, IdentityError, IdentityResult};

#[derive(Deserialize)]
struct ChallengeResponse {
    challenge: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Client for the verifier backend.
#[derive(Debug, Clone)]
pub struct VerifierClient {
    http: Client,
    base: String,
}

impl VerifierClient {
    pub fn new(config: &VerifierConfig) -> IdentityResult<Self> {
        Url::parse(&config.url)
            .map_err(|e| IdentityError::Http(format!("Invalid verifier URL '{}': {}", config.url, e)))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask for a fresh challenge bound to `account`.
    pub async fn get_challenge(&self, account: &str) -> IdentityResult<String> {
        let response = self
            .http
            .get(self.endpoint("challenge"))
            .query(&[("address", account)])
            .send()
            .await
            .map_err(|e| IdentityError::Challenge(e.to_string()))?;

        let response = check_status(response)
            .await
            .map_err(IdentityError::Challenge)?;
        let body: ChallengeResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Challenge(format!("Malformed challenge: {}", e)))?;

        tracing::debug!(account, "Challenge received");
        Ok(body.challenge)
    }

    /// The statement the verifier will check proofs against.
    pub async fn get_statement(&self) -> IdentityResult<IdStatement> {
        let response = self
            .http
            .get(self.endpoint("statement"))
            .send()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;
        let response = check_status(response).await.map_err(IdentityError::Http)?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        // Some verifiers send the statement JSON encoded as a string.
        let body = match body {
            Value::String(text) => {
                serde_json::from_str(&text).map_err(|e| IdentityError::Http(e.to_string()))?
            }
            other => other,
        };
        parse_statement(body)
    }

    /// Exchange a proof for the verifier's signature over the account.
    pub async fn get_signature(
        &self,
        challenge: &str,
        proof: &IdProofOutput,
    ) -> IdentityResult<String> {
        let response = self
            .http
            .post(self.endpoint("prove"))
            .json(&json!({ "challenge": challenge, "proof": proof }))
            .send()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        let response = check_status(response)
            .await
            .map_err(IdentityError::Verification)?;
        response
            .json::<String>()
            .await
            .map_err(|e| IdentityError::Verification(format!("Malformed signature: {}", e)))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }
}

/// Pass 2xx responses through; otherwise extract the verifier's message.
async fn check_status(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    tracing::warn!(status = status.as_u16(), message = %message, "Verifier returned error");
    Err(format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let client = VerifierClient::new(&VerifierConfig {
            url: "http://localhost:8020/api/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.endpoint("prove"), "http://localhost:8020/api/prove");
    }

    #[test]
    fn test_invalid_url() {
        let result = VerifierClient::new(&VerifierConfig {
            url: "localhost".into(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(IdentityError::Http(_))));
    }
}
