use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use marketplace_api::core::client::{ResponseCache, cache_key};
use marketplace_api::{ApiRequest, CacheMode, CachePolicy};
use reqwest::Method;
use serde_json::{Value, json};

use crate::common::{self, StubTransport, json_response};

fn mock_offers(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/x");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"items":[1,2,3]}"#);
    })
}

#[tokio::test]
async fn second_call_within_ttl_is_served_from_cache() {
    let server = MockServer::start();
    let mock = mock_offers(&server);
    let client = common::client_for(&server);

    let req = ApiRequest::get("/x").cache(CachePolicy::enabled(Duration::from_millis(1000)));
    let first: Value = client.request(req.clone()).await.unwrap();
    let second: Value = client.request(req).await.unwrap();

    mock.assert_calls(1);
    assert_eq!(first, second);
    assert_eq!(first["items"][2], 3);
}

#[tokio::test]
async fn expired_entry_goes_back_to_the_network() {
    let server = MockServer::start();
    let mock = mock_offers(&server);
    let client = common::client_for(&server);

    let req = ApiRequest::get("/x").cache(CachePolicy::enabled(Duration::from_millis(1)));
    let _: Value = client.request(req.clone()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let _: Value = client.request(req).await.unwrap();

    mock.assert_calls(2);
}

#[tokio::test]
async fn gets_are_cached_by_default() {
    let server = MockServer::start();
    let mock = mock_offers(&server);
    let client = common::client_for(&server);

    let _: Value = client.get("/x", None).await.unwrap();
    let _: Value = client.get("/x", None).await.unwrap();

    mock.assert_calls(1);
}

#[tokio::test]
async fn disabled_policy_never_reads_or_writes() {
    let server = MockServer::start();
    let mock = mock_offers(&server);
    let client = common::client_for(&server);

    let req = ApiRequest::get("/x").cache(CachePolicy::disabled());
    let _: Value = client.request(req.clone()).await.unwrap();
    let _: Value = client.request(req).await.unwrap();

    mock.assert_calls(2);
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn refresh_skips_the_read_but_updates_the_entry() {
    let server = MockServer::start();
    let mock = mock_offers(&server);
    let client = common::client_for(&server);

    let _: Value = client.request(ApiRequest::get("/x")).await.unwrap();
    mock.assert_calls(1);

    let refresh = CachePolicy::default().mode(CacheMode::Refresh);
    let _: Value = client.request(ApiRequest::get("/x").cache(refresh)).await.unwrap();
    mock.assert_calls(2);

    let _: Value = client.request(ApiRequest::get("/x")).await.unwrap();
    mock.assert_calls(2);
}

#[tokio::test]
async fn posts_are_not_cached_unless_asked() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/negociacoes/busca");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"results":[]}"#);
    });
    let client = common::client_for(&server);
    let body = json!({"status": "open"});

    for _ in 0..2 {
        let _: Value = client
            .request(ApiRequest::post("/negociacoes/busca").body(body.clone()))
            .await
            .unwrap();
    }
    mock.assert_calls(2);

    for _ in 0..2 {
        let _: Value = client
            .request(
                ApiRequest::post("/negociacoes/busca")
                    .body(body.clone())
                    .cache(CachePolicy::enabled(Duration::from_secs(10))),
            )
            .await
            .unwrap();
    }
    mock.assert_calls(3);
}

#[tokio::test]
async fn explicit_key_wins_over_the_derived_one() {
    let stub = StubTransport::new(|req, _| {
        Ok(json_response(200, &format!(r#"{{"path":"{}"}}"#, req.url.path())))
    });
    let client = common::stub_client(&stub);

    let policy = CachePolicy::enabled(Duration::from_secs(10)).key("profile");
    let a: Value = client.request(ApiRequest::get("/me").cache(policy.clone())).await.unwrap();
    let b: Value = client.request(ApiRequest::get("/users/7").cache(policy)).await.unwrap();

    assert_eq!(stub.calls(), 1);
    assert_eq!(a, b);
    assert_eq!(b["path"], "/me");
}

#[tokio::test]
async fn error_responses_are_never_cached() {
    let stub = StubTransport::always(400, r#"{"message":"bad filter"}"#);
    let client = common::stub_client(&stub);

    for _ in 0..2 {
        let _ = client.request::<Value>(ApiRequest::get("/ofertas?preco=-1")).await;
    }
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn clear_cache_by_prefix() {
    let stub = StubTransport::always(200, r#"{"ok":true}"#);
    let client = common::stub_client(&stub);

    let _: Value = client.get("/notificacoes", None).await.unwrap();
    let _: Value = client.get("/agenda", None).await.unwrap();
    assert_eq!(stub.calls(), 2);

    client.clear_cache(Some("/notif")).await;
    let _: Value = client.get("/notificacoes", None).await.unwrap();
    let _: Value = client.get("/agenda", None).await.unwrap();
    assert_eq!(stub.calls(), 3);

    client.clear_cache(None).await;
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn response_cache_overwrites_and_expires() {
    let cache = ResponseCache::new();
    cache.set("k", json!(1), Duration::from_secs(10)).await;
    cache.set("k", json!(2), Duration::from_secs(10)).await;
    assert_eq!(cache.get("k").await, Some(json!(2)));
    assert_eq!(cache.len().await, 1);

    cache.set("short", json!("x"), Duration::from_millis(1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(cache.get("short").await, None);
    assert_eq!(cache.len().await, 1, "expired entry is evicted on read");

    cache.set("zero", json!(0), Duration::ZERO).await;
    assert_eq!(cache.get("zero").await, None);
}

#[test]
fn cache_keys() {
    assert_eq!(cache_key(&Method::GET, "/x?page=2", None, None), "/x?page=2");
    assert_eq!(cache_key(&Method::GET, "/x", None, Some("custom")), "custom");

    let a = cache_key(&Method::POST, "/x", Some(&json!({"b": 1, "a": 2})), None);
    let b = cache_key(&Method::POST, "/x", Some(&json!({"a": 2, "b": 1})), None);
    assert_eq!(a, b, "body serialization is order-independent");
    assert_ne!(a, cache_key(&Method::PUT, "/x", Some(&json!({"a": 2, "b": 1})), None));
    assert_ne!(a, cache_key(&Method::GET, "/x", None, None));
}

#[tokio::test]
async fn writes_sweep_expired_entries() {
    let cache = ResponseCache::new();
    cache.set("GET /ofertas?page=1", json!(1), Duration::from_millis(1)).await;
    cache.set("GET /ofertas?page=2", json!(2), Duration::from_millis(1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    cache.set("GET /ofertas?page=3", json!(3), Duration::from_secs(60)).await;

    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.get("GET /ofertas?page=3").await, Some(json!(3)));
}
