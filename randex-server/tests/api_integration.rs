//! API integration tests for randex-server.
//!
//! These tests drive the sampling endpoint through the full router with
//! oneshot requests, over a real manifest directory and the in-memory
//! delegate indexer.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use randex_core::{
    ContextId, IndexRecord, Indexer, MemoryIndexer, Multihash, ProviderId, SamplingStore,
};
use randex_server::{create_router, AppState, SampleResponse};
use serde_json::Value;
use tower::ServiceExt;

const PROVIDER: &str = "12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh";
// URL-safe base64 of "yoyo", with padding percent-encoded.
const CONTEXT_PATH: &str = "eW95bw%3D%3D";

fn test_app(home: &std::path::Path) -> (Router, Arc<SamplingStore>) {
    let store = Arc::new(
        SamplingStore::new(home, Arc::new(MemoryIndexer::new())).expect("create store"),
    );
    let app = create_router(AppState {
        store: store.clone(),
    });
    (app, store)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn valid_request_over_empty_population_returns_no_samples() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    let (status, body) = get(app, &format!("/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["samples"], serde_json::json!([]));
}

#[tokio::test]
async fn invalid_provider_id_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    // Percent-encoded pufferfish emoji.
    let (status, body) = get(app, &format!("/ipni/v0/sample/%F0%9F%90%A1/{CONTEXT_PATH}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid provider ID");
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn invalid_context_id_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    let (status, body) = get(app, &format!("/ipni/v0/sample/{PROVIDER}/%F0%9F%90%A0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid context ID");
}

#[tokio::test]
async fn malformed_and_oversized_beacons_are_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    let base = format!("/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}");

    let (status, _) = get(app.clone(), &format!("{base}?beacon=nothex")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let oversized = "ab".repeat(33);
    let (status, body) = get(app, &format!("{base}?beacon={oversized}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn out_of_range_max_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    let base = format!("/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}");
    for max in ["0", "11", "half"] {
        let (status, body) = get(app.clone(), &format!("{base}?max={max}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "max={max}");
        assert_eq!(body["code"], "INVALID_INPUT");
    }
}

#[tokio::test]
async fn malformed_federation_epoch_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (app, _) = test_app(home.path());
    let (status, body) = get(
        app,
        &format!("/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}?federation_epoch=soon"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid federation epoch");
}

#[tokio::test]
async fn fixed_beacon_request_is_reproducible_over_seeded_store() {
    let home = tempfile::tempdir().unwrap();
    let (app, store) = test_app(home.path());

    let record = IndexRecord {
        provider_id: ProviderId::parse(PROVIDER).unwrap(),
        context_id: ContextId::new(b"yoyo".to_vec()).unwrap(),
        metadata: Vec::new(),
    };
    let mhs: Vec<Multihash> = (0..100u8)
        .map(|i| Multihash::from(vec![0x12, 0x20, i, i.wrapping_add(1)]))
        .collect();
    store.put(record, &mhs).await.unwrap();

    let uri = format!(
        "/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}?beacon={}&max=5",
        "ab".repeat(32)
    );
    let (status, first) = get(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: SampleResponse = serde_json::from_value(first.clone()).unwrap();
    assert_eq!(parsed.samples.len(), 5);

    let (_, second) = get(app, &uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn generated_beacon_still_samples_the_population() {
    let home = tempfile::tempdir().unwrap();
    let (app, store) = test_app(home.path());

    let record = IndexRecord {
        provider_id: ProviderId::parse(PROVIDER).unwrap(),
        context_id: ContextId::new(b"yoyo".to_vec()).unwrap(),
        metadata: Vec::new(),
    };
    let mhs: Vec<Multihash> = (0..10u8)
        .map(|i| Multihash::from(vec![0x12, 0x20, i]))
        .collect();
    store.put(record, &mhs).await.unwrap();

    let (status, body) = get(
        app,
        &format!("/ipni/v0/sample/{PROVIDER}/{CONTEXT_PATH}?max=3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["samples"].as_array().unwrap().len(), 3);
}
