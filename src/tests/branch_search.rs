// Branch search end to end: filters are whitelisted, the token travels in the
// `token` header, and every failure turns into an empty result.

use std::time::Duration;

use axum::routing::post;
use chrono::TimeDelta;
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::{json, Value};

use crate::api::filters::FilterSet;
use crate::api::meest::MeestExpress;
use crate::cache::memory_store::MemoryTokenStore;
use crate::cache::store::TokenStore;
use crate::config::settings::Credentials;
use crate::error::MeestError;
use crate::helpers::time;
use crate::tests::common::{auth_reply, record, spawn_axum, test_config, Router};
use crate::utils::constants::TOKEN_CACHE_KEY;

fn client(base_url: &str) -> MeestExpress<MemoryTokenStore> {
    MeestExpress::with_store(&test_config(base_url), MemoryTokenStore::new()).unwrap()
}

fn branches_reply() -> Value {
    json!({
        "status": "OK",
        "result": [
            {"branchID": "b1", "branchNo": 12, "cityDescr": {"descrUA": "Київ"}},
            {"branchID": "b2", "branchNo": 40, "cityDescr": {"descrUA": "Київ"}}
        ]
    })
}

#[tokio::test]
async fn search_sends_whitelisted_filters_with_token_header() {
    let server = MockServer::start_async().await;
    let auth = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("tok-1"));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/branchSearch")
                .header("token", "tok-1")
                .header("accept", "application/json")
                .json_body(json!({"filters": {"cityDescr": "Київ", "branchTypeID": "t-1"}}));
            then.status(200).json_body(branches_reply());
        })
        .await;

    let mut meest = client(&server.base_url());
    let filters = FilterSet::from_input([
        ("cityDescr", json!("Київ")),
        ("limit", json!(100)),
        ("branchTypeID", json!("t-1")),
        ("token", json!("forged")),
    ]);

    let branches = meest.get_branches(&filters).await;
    assert_eq!(branches, branches_reply());

    // second search reuses the cached token
    let branches = meest.try_get_branches(&filters).await.unwrap();
    assert_eq!(branches, branches_reply());

    auth.assert_hits_async(1).await;
    search.assert_hits_async(2).await;
}

#[tokio::test]
async fn empty_filter_set_is_sent_as_empty_object() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("tok-1"));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST).path("/branchSearch").json_body(json!({"filters": {}}));
            then.status(200).json_body(json!({"result": []}));
        })
        .await;

    let mut meest = client(&server.base_url());
    let filters = FilterSet::from_input([("unknown", "x")]);
    assert_eq!(meest.get_branches(&filters).await, json!({"result": []}));
    search.assert_hits_async(1).await;
}

#[tokio::test]
async fn search_error_status_yields_empty_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("tok-1"));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST).path("/branchSearch");
            then.status(500).body("upstream down");
        })
        .await;

    let mut meest = client(&server.base_url());
    let filters = FilterSet::new();

    let err = meest.try_get_branches(&filters).await.unwrap_err();
    assert!(matches!(err, MeestError::Status(status) if status.as_u16() == 500), "got {err:?}");

    assert_eq!(meest.get_branches(&filters).await, json!([]));
    // no retry
    search.assert_hits_async(2).await;
}

#[tokio::test]
async fn undecodable_search_body_yields_empty_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("tok-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/branchSearch");
            then.status(200).body("{\"result\": [");
        })
        .await;

    let mut meest = client(&server.base_url());
    let err = meest.try_get_branches(&FilterSet::new()).await.unwrap_err();
    assert!(matches!(err, MeestError::Response(_)), "got {err:?}");
    assert_eq!(meest.get_branches(&FilterSet::new()).await, json!([]));
}

#[tokio::test]
async fn authentication_failure_yields_empty_result_without_search() {
    let server = MockServer::start_async().await;
    let auth = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(403).json_body(json!({"status": "ERROR"}));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST).path("/branchSearch");
            then.status(200).json_body(branches_reply());
        })
        .await;

    let mut meest = client(&server.base_url());
    assert_eq!(meest.get_branches(&FilterSet::new()).await, json!([]));

    auth.assert_hits_async(1).await;
    search.assert_hits_async(0).await;
}

#[tokio::test]
async fn missing_credentials_are_swallowed_by_search_but_not_by_token() {
    let server = MockServer::start_async().await;
    let auth = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("tok-1"));
        })
        .await;

    let mut config = test_config(&server.base_url());
    config.credentials = Credentials::default();
    config.debug = true;
    let mut meest = MeestExpress::with_store(&config, MemoryTokenStore::new()).unwrap();

    assert_eq!(meest.get_branches(&FilterSet::new()).await, json!([]));
    let err = meest.get_token().await.unwrap_err();
    assert!(matches!(err, MeestError::Configuration(_)), "got {err:?}");
    auth.assert_hits_async(0).await;
}

#[tokio::test]
async fn shared_token_is_sent_without_authenticating() {
    let server = MockServer::start_async().await;
    let auth = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth");
            then.status(200).json_body(auth_reply("fresh"));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST).path("/branchSearch").header("token", "shared");
            then.status(200).json_body(branches_reply());
        })
        .await;

    let store = MemoryTokenStore::new();
    store
        .put(TOKEN_CACHE_KEY, record("shared", TimeDelta::hours(2)), time::token_ttl())
        .await
        .unwrap();
    let mut meest = MeestExpress::with_store(&test_config(&server.base_url()), store).unwrap();

    assert_eq!(meest.get_branches(&FilterSet::new()).await, branches_reply());
    auth.assert_hits_async(0).await;
    search.assert_hits_async(1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_search_times_out_into_empty_result() {
    let router = Router::new()
        .route(
            "/auth",
            post(|| async { axum::Json(auth_reply("tok-1")) }),
        )
        .route(
            "/branchSearch",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                axum::Json(branches_reply())
            }),
        );
    let (handle, addr) = spawn_axum(router).await;

    let mut config = test_config(&format!("http://{}", addr));
    config.api.timeout_seconds = 1;
    let mut meest = MeestExpress::with_store(&config, MemoryTokenStore::new()).unwrap();

    let err = meest.try_get_branches(&FilterSet::new()).await.unwrap_err();
    assert!(matches!(err, MeestError::Transport(ref e) if e.is_timeout()), "got {err:?}");
    assert_eq!(meest.get_branches(&FilterSet::new()).await, json!([]));

    handle.abort();
}
