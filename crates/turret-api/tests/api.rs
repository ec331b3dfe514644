//! Handler-level tests over mocked collaborators.

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use turret_api::handlers::{self, UploadBody};
use turret_api::AppState;
use turret_core::{Amount, Network, TurretConfig, TurretError};
use turret_heal::HealEngine;
use turret_store::{MemoryKvStore, TxFunctionStore};
use turret_testkit::{account_id, fee_payment_envelope, signing_key, trust_document, FixedClock, MockLedger};
use turret_trust::TrustRegistry;

fn config() -> TurretConfig {
    TurretConfig {
        network: Network::Test,
        turret_address: account_id(1),
        upload_divisor: 1000,
        horizon_url: "http://mock".into(),
        request_timeout_ms: 1_000,
        heal_window_secs: 300,
        min_heal_fee_stroops: 100,
        max_heal_fee_stroops: 1_000_000,
    }
}

fn state() -> AppState {
    let ledger = Arc::new(MockLedger::new());
    let store = Arc::new(TxFunctionStore::new(
        Arc::new(MemoryKvStore::new()),
        Arc::new(MemoryKvStore::new()),
        ledger.clone(),
        config(),
    ));
    let trust = Arc::new(TrustRegistry::from_toml_str(&trust_document(&[account_id(3)])).unwrap());
    let engine = Arc::new(HealEngine::new(
        trust,
        ledger,
        store.clone(),
        Arc::new(FixedClock(1_700_000_000)),
        config(),
    ));
    AppState {
        store,
        engine,
        config: config(),
    }
}

#[tokio::test]
async fn upload_round_trip_and_publishing_endpoint() {
    let state = state();
    let code = vec![b'x'; 2000];
    let cost = Amount::upload_cost(2000, 1000).unwrap();

    let response = handlers::upload(
        State(state.clone()),
        Json(UploadBody {
            code: BASE64.encode(&code),
            fields: None,
            fee_payment: fee_payment_envelope(
                &signing_key(50),
                account_id(1),
                cost,
                1,
                Network::Test,
            ),
        }),
    )
    .await
    .unwrap();

    // The publishing endpoint serves the signer peers will resolve.
    let published = handlers::tx_function_signer(
        State(state),
        Path(response.0.hash.to_string()),
    )
    .await
    .unwrap();
    assert_eq!(published.0.signer, response.0.signer);
}

#[tokio::test]
async fn underpaid_upload_maps_to_402_with_cost_and_turret() {
    let state = state();
    let err = handlers::upload(
        State(state),
        Json(UploadBody {
            code: BASE64.encode(vec![b'x'; 2000]),
            fields: None,
            fee_payment: fee_payment_envelope(
                &signing_key(50),
                account_id(1),
                Amount::from_stroops(1),
                1,
                Network::Test,
            ),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(err.turret, Some(account_id(1)));
    assert_matches!(err.error, TurretError::Payment { cost: Some(_), .. });
}

#[tokio::test]
async fn non_base64_code_is_a_400() {
    let state = state();
    let err = handlers::upload(
        State(state),
        Json(UploadBody {
            code: "%%%".into(),
            fields: None,
            fee_payment: String::new(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_function_is_a_404_and_bad_hash_a_400() {
    let state = state();
    let err = handlers::tx_function_signer(State(state.clone()), Path("ab".repeat(32)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err = handlers::tx_function_signer(State(state), Path("not-a-hash".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_heal_request_is_a_400_with_message() {
    let state = state();
    let err = handlers::heal(
        State(state),
        Json(serde_json::json!({
            "control_account": "not-a-key",
            "old_turret": "x",
            "new_turret": "y",
            "tx_function_hash": "z",
            "timestamp": 0,
            "fee": 100,
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_matches!(err.error, TurretError::Validation { .. });
}
