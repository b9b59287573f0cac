//! Identity handshake against a mock verifier.

mod common;

use serde_json::json;
use std::sync::{Arc, Mutex};

use auction_client::config::schema::VerifierConfig;
use auction_client::identity::{IdentityError, IdentityProofClient, VerifierClient};

use common::{start_programmable_backend, CapturedRequest, StubWallet, CREDENTIAL};

const SIGNATURE: &str = "6A5B3C";

async fn verifier(prove_ok: bool) -> (VerifierClient, Arc<Mutex<Vec<CapturedRequest>>>) {
    let seen: Arc<Mutex<Vec<CapturedRequest>>> = Arc::default();
    let log = seen.clone();
    let addr = start_programmable_backend(move |req| {
        log.lock().unwrap().push(req.clone());
        async move {
            if req.path.starts_with("/api/challenge") {
                (200, json!({"challenge": "c0ffee"}).to_string())
            } else if req.path == "/api/statement" {
                let statement = json!([{
                    "type": "AttributeInSet",
                    "attributeTag": "nationality",
                    "set": ["DK", "SE"]
                }]);
                // Served as a JSON-encoded string
                (200, json!(statement.to_string()).to_string())
            } else if req.path == "/api/prove" && prove_ok {
                (200, json!(SIGNATURE).to_string())
            } else if req.path == "/api/prove" {
                (400, json!({"code": 400, "message": "Invalid proofs."}).to_string())
            } else {
                (404, json!({"code": 404, "message": "Not Found"}).to_string())
            }
        }
    })
    .await;

    let client = VerifierClient::new(&VerifierConfig {
        url: format!("http://{}/api", addr),
        timeout_secs: 5,
    })
    .unwrap();
    (client, seen)
}

#[tokio::test]
async fn test_full_handshake() {
    let (verifier, seen) = verifier(true).await;
    let wallet = StubWallet::new("acc-1");
    let identity = IdentityProofClient::new(verifier).unwrap();

    let signature = identity.obtain_signature(&wallet, "acc-1").await.unwrap();
    assert_eq!(signature, SIGNATURE);

    // The wallet proved against the challenge the verifier issued
    assert_eq!(
        wallet.proof_requests.lock().unwrap().clone(),
        vec![("acc-1".to_string(), "c0ffee".to_string())]
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/challenge?address=acc-1");
    assert_eq!(seen[1].method, "POST");
    let body = seen[1].json();
    assert_eq!(body["challenge"], "c0ffee");
    assert_eq!(body["proof"]["credential"], CREDENTIAL);
    assert_eq!(body["proof"]["proof"]["v"], 0);
    assert_eq!(body["proof"]["proof"]["value"]["proofs"], json!([]));
}

#[tokio::test]
async fn test_denied_proof_stops_before_prove() {
    let (verifier, seen) = verifier(true).await;
    let wallet = StubWallet::denying("acc-1");

    let err = IdentityProofClient::new(verifier).unwrap()
        .obtain_signature(&wallet, "acc-1")
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::ProofDenied(_)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_proof_carries_message() {
    let (verifier, _) = verifier(false).await;
    let wallet = StubWallet::new("acc-1");

    let err = IdentityProofClient::new(verifier).unwrap()
        .obtain_signature(&wallet, "acc-1")
        .await
        .unwrap_err();

    match err {
        IdentityError::Verification(message) => assert!(message.contains("Invalid proofs.")),
        other => panic!("expected verification error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_statement_from_verifier() {
    let (verifier, _) = verifier(true).await;
    let statement = verifier.get_statement().await.unwrap();
    assert_eq!(statement.statements.len(), 1);
    let value = serde_json::to_value(&statement).unwrap();
    assert_eq!(value[0]["attributeTag"], "nationality");
    assert_eq!(value[0]["set"], json!(["DK", "SE"]));
}

#[tokio::test]
async fn test_wallet_receives_eu_statement() {
    let (verifier, _) = verifier(true).await;
    let identity = IdentityProofClient::new(verifier).unwrap();
    let value = serde_json::to_value(identity.statement()).unwrap();
    assert_eq!(value[0]["type"], "AttributeInSet");
    assert_eq!(value[0]["set"].as_array().unwrap().len(), 27);
}

#[tokio::test]
async fn test_unreachable_verifier() {
    let verifier = VerifierClient::new(&VerifierConfig {
        url: "http://127.0.0.1:1/api".into(),
        timeout_secs: 1,
    })
    .unwrap();
    let err = verifier.get_challenge("acc").await.unwrap_err();
    assert!(matches!(err, IdentityError::Challenge(_)));
}
