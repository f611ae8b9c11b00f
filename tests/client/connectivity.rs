use std::time::Duration;

use httpmock::Method::HEAD;
use httpmock::MockServer;
use marketplace_api::{ApiClient, ApiRequest, ErrorKind, ProbeMode};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

use crate::common::{self, StubTransport, json_response, unreachable_err};

fn live_client(stub: &Arc<StubTransport>, ttl: Duration) -> ApiClient {
    common::test_builder()
        .probe_mode(ProbeMode::Live)
        .base_url(common::url("http://primary.test"))
        .probe_urls([
            common::url("http://public-a.test/generate_204"),
            common::url("http://public-b.test/"),
        ])
        .connectivity_ttl(ttl)
        .transport(stub.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn assume_online_never_touches_the_network() {
    let stub = StubTransport::always_unreachable();
    let client = common::stub_client(&stub);

    assert!(client.check_connectivity().await);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn any_http_answer_counts_as_reachable_and_is_cached() {
    let stub = StubTransport::always(503, "");
    let client = live_client(&stub, Duration::from_secs(10));

    assert!(client.check_connectivity().await);
    assert!(client.check_connectivity().await);

    assert_eq!(stub.calls(), 1);
    let probe = &stub.requests()[0];
    assert_eq!(probe.method, Method::HEAD);
    assert_eq!(probe.url.host_str(), Some("primary.test"));
    assert!(!probe.follow_redirects);
    assert_eq!(probe.timeout, Some(Duration::from_millis(5000)));
}

#[tokio::test]
async fn later_targets_are_tried_in_priority_order() {
    let stub = StubTransport::new(|req, _| match req.url.host_str() {
        Some("public-b.test") => Ok(json_response(204, "")),
        _ => Err(unreachable_err()),
    });
    let client = live_client(&stub, Duration::from_secs(10));

    assert!(client.check_connectivity().await);
    assert_eq!(stub.hosts(), ["primary.test:80", "public-a.test:80", "public-b.test:80"]);
}

#[tokio::test]
async fn negative_result_lives_half_as_long() {
    let stub = StubTransport::always_unreachable();
    let client = live_client(&stub, Duration::from_millis(200));

    assert!(!client.check_connectivity().await);
    assert_eq!(stub.calls(), 3);

    let status = client.connectivity().last_status().await.unwrap();
    assert!(!status.is_reachable);
    assert_eq!(status.valid_for, Duration::from_millis(100));

    assert!(!client.check_connectivity().await);
    assert_eq!(stub.calls(), 3, "fresh negative result is reused");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!client.check_connectivity().await);
    assert_eq!(stub.calls(), 6, "stale negative result is re-probed");
}

#[tokio::test]
async fn invalidate_forces_a_new_probe() {
    let stub = StubTransport::always(200, "");
    let client = live_client(&stub, Duration::from_secs(10));

    assert!(client.check_connectivity().await);
    client.connectivity().invalidate().await;
    assert!(client.check_connectivity().await);
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn probes_a_real_server_with_head() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(HEAD).path("/");
        then.status(404);
    });

    let client = ApiClient::builder()
        .base_url(common::url(&server.base_url()))
        .probe_urls(Vec::<url::Url>::new())
        .build()
        .unwrap();

    assert!(client.check_connectivity().await);
    mock.assert_calls(1);
}

#[tokio::test]
async fn preflight_fails_fast_when_offline() {
    let stub = StubTransport::always_unreachable();
    let client = common::test_builder()
        .probe_mode(ProbeMode::Live)
        .preflight_connectivity(true)
        .base_url(common::url("http://primary.test"))
        .probe_urls(Vec::<url::Url>::new())
        .transport(stub.clone())
        .build()
        .unwrap();

    let err = client
        .request::<Value>(ApiRequest::get("/ofertas"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(stub.calls(), 1, "only the probe was sent");
    assert!(stub.requests().iter().all(|r| r.method == Method::HEAD));
}
