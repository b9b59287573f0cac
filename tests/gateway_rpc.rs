//! JSON-RPC gateway and wallet bridge against mock HTTP backends.

mod common;

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

use auction_client::blockchain::types::{
    ChainError, ContractAddress, InvokeContext, InvokeResult, TransactionHandle,
    TransactionStatusKind,
};
use auction_client::blockchain::wallet::{WalletError, WalletEvent, WalletProvider};
use auction_client::blockchain::{ChainGateway, JsonRpcGateway, JsonRpcWallet};
use auction_client::config::schema::{GatewayConfig, WalletConfig};
use auction_client::identity::eu_nationality;
use auction_client::lifecycle::CancelToken;

use common::{
    proof_json, rpc_error, rpc_result, start_mock_backend, start_programmable_backend,
    CapturedRequest,
};

fn gateway(primary: String, failover: Vec<String>) -> JsonRpcGateway {
    JsonRpcGateway::new(GatewayConfig {
        rpc_url: primary,
        failover_urls: failover,
        rpc_timeout_secs: 5,
    })
    .unwrap()
}

fn view_context() -> InvokeContext {
    InvokeContext {
        contract: ContractAddress::new(7),
        method: "dino_auction.view".into(),
        parameter: String::new(),
        invoker: None,
    }
}

#[tokio::test]
async fn test_invoke_sends_json_rpc() {
    let seen: Arc<Mutex<Vec<CapturedRequest>>> = Arc::default();
    let log = seen.clone();
    let addr = start_programmable_backend(move |req| {
        log.lock().unwrap().push(req);
        async { rpc_result(json!({"tag": "success", "returnValue": "00", "usedEnergy": 12})) }
    })
    .await;

    let gw = gateway(format!("http://{}", addr), vec![]);
    let result = gw.invoke_contract(&view_context()).await.unwrap();

    assert_eq!(
        result,
        InvokeResult::Success {
            return_value: Some("00".into()),
            used_energy: 12
        }
    );

    let req = seen.lock().unwrap()[0].clone();
    assert_eq!(req.method, "POST");
    let body = req.json();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "invokeContract");
    assert_eq!(body["params"]["method"], "dino_auction.view");
    assert_eq!(body["params"]["contract"]["index"], 7);
}

#[tokio::test]
async fn test_reads_fail_over() {
    let primary = start_mock_backend(503, "unavailable").await;
    let secondary = start_programmable_backend(|_| async {
        rpc_result(json!({"status": "finalized", "outcomes": {}}))
    })
    .await;

    let gw = gateway(
        format!("http://{}", primary),
        vec![format!("http://{}", secondary)],
    );
    let status = gw
        .get_transaction_status(&TransactionHandle("abc".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.status, TransactionStatusKind::Finalized);
}

#[tokio::test]
async fn test_remote_error_is_not_failed_over() {
    let secondary_hits = Arc::new(AtomicUsize::new(0));
    let primary = start_programmable_backend(|_| async { rpc_error(-32602, "bad params") }).await;
    let hits = secondary_hits.clone();
    let secondary = start_programmable_backend(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
        async { rpc_result(json!(null)) }
    })
    .await;

    let gw = gateway(
        format!("http://{}", primary),
        vec![format!("http://{}", secondary)],
    );
    let err = gw.invoke_contract(&view_context()).await.unwrap_err();

    assert!(matches!(err, ChainError::Remote { code: -32602, .. }));
    assert_eq!(secondary_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_transaction_is_none() {
    let addr = start_programmable_backend(|_| async { rpc_result(json!(null)) }).await;
    let gw = gateway(format!("http://{}", addr), vec![]);

    let status = gw
        .get_transaction_status(&TransactionHandle("missing".into()))
        .await
        .unwrap();
    assert!(status.is_none());
}

#[tokio::test]
async fn test_all_endpoints_down() {
    let primary = start_mock_backend(500, "boom").await;
    let gw = gateway(format!("http://{}", primary), vec![]);

    let err = gw.invoke_contract(&view_context()).await.unwrap_err();
    assert!(err.to_string().contains("All RPC endpoints failed"));
}

fn wallet(addr: std::net::SocketAddr) -> JsonRpcWallet {
    JsonRpcWallet::new(&WalletConfig {
        bridge_url: format!("http://{}", addr),
        timeout_secs: 5,
        event_poll_ms: 10,
    })
    .unwrap()
}

#[tokio::test]
async fn test_wallet_connect_publishes_account() {
    let addr = start_programmable_backend(|req| async move {
        assert_eq!(req.json()["method"], "connect");
        rpc_result(json!("3kBx2h5Y2veb4hZgAJWPrr8RyQESKm5TjzF3ti1QQ4VSYLwK1G"))
    })
    .await;
    let wallet = wallet(addr);
    let mut events = wallet.subscribe();

    let account = wallet.connect().await.unwrap();
    assert_eq!(account, "3kBx2h5Y2veb4hZgAJWPrr8RyQESKm5TjzF3ti1QQ4VSYLwK1G");
    assert_eq!(events.recv().await, Some(WalletEvent::AccountChanged(account)));
}

#[tokio::test]
async fn test_wallet_without_account() {
    let addr = start_programmable_backend(|_| async { rpc_result(json!(null)) }).await;
    let err = wallet(addr).connect().await.unwrap_err();
    assert!(matches!(err, WalletError::NotConnected));
}

#[tokio::test]
async fn test_wallet_proof_denied() {
    let addr = start_programmable_backend(|req| async move {
        let body = req.json();
        assert_eq!(body["method"], "requestIdProof");
        assert_eq!(body["params"]["challenge"], "c0ffee");
        assert_eq!(body["params"]["statement"][0]["attributeTag"], "nationality");
        rpc_error(4001, "user declined")
    })
    .await;

    let statement = eu_nationality().unwrap();
    let err = wallet(addr)
        .request_id_proof("acc", &statement, "c0ffee")
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Rejected(ref m) if m == "user declined"));
}

#[tokio::test]
async fn test_wallet_proof_is_typed() {
    let addr = start_programmable_backend(|_| async { rpc_result(proof_json()) }).await;

    let statement = eu_nationality().unwrap();
    let proof = wallet(addr)
        .request_id_proof("acc", &statement, "c0ffee")
        .await
        .unwrap();
    assert!(proof.proof.value.proofs.is_empty());
    assert_eq!(serde_json::to_value(&proof).unwrap(), proof_json());
}

#[tokio::test]
async fn test_bridge_events_reach_subscribers() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();
    let addr = start_programmable_backend(move |req| {
        assert_eq!(req.json()["method"], "events");
        let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
        async move {
            if first {
                rpc_result(json!([
                    {"type": "accountDisconnected", "account": "acc-1"},
                    {"type": "chainChanged", "chain": "testnet"}
                ]))
            } else {
                rpc_result(json!([]))
            }
        }
    })
    .await;

    let wallet = wallet(addr);
    let cancel = CancelToken::new();
    let mut events = wallet.subscribe();
    let pump = wallet.spawn_event_pump(cancel.clone());

    let wait = Duration::from_secs(5);
    assert_eq!(
        timeout(wait, events.recv()).await.unwrap(),
        Some(WalletEvent::AccountDisconnected("acc-1".into()))
    );
    assert_eq!(
        timeout(wait, events.recv()).await.unwrap(),
        Some(WalletEvent::ChainChanged("testnet".into()))
    );

    cancel.cancel();
    timeout(wait, pump).await.unwrap().unwrap();
    assert!(polls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_event_pump_stops_with_last_subscription() {
    let addr = start_programmable_backend(|_| async { rpc_result(json!([])) }).await;
    let wallet = wallet(addr);

    let events = wallet.subscribe();
    let pump = wallet.spawn_event_pump(CancelToken::new());
    drop(events);

    timeout(Duration::from_secs(5), pump).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_event_poll_failure_keeps_pumping() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();
    let addr = start_programmable_backend(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                (500, "boom".to_string())
            } else {
                rpc_result(json!([{"type": "accountChanged", "account": "acc-2"}]))
            }
        }
    })
    .await;

    let wallet = wallet(addr);
    let cancel = CancelToken::new();
    let mut events = wallet.subscribe();
    let _pump = wallet.spawn_event_pump(cancel.clone());

    let event = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(event, Some(WalletEvent::AccountChanged("acc-2".into())));
    cancel.cancel();
}
