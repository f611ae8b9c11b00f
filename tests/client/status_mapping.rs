use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use marketplace_api::core::net::TransportError;
use marketplace_api::core::{classify_status, classify_transport};
use marketplace_api::{ApiRequest, ErrorKind};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::common::{self, StubTransport, json_response, text_response};

#[test]
fn statuses_map_to_kinds() {
    let table = [
        (400, ErrorKind::Validation, "VALIDATION_ERROR"),
        (401, ErrorKind::AuthTokenExpired, "AUTH_TOKEN_EXPIRED"),
        (403, ErrorKind::AuthForbidden, "AUTH_FORBIDDEN"),
        (404, ErrorKind::NotFound, "DATA_NOT_FOUND"),
        (409, ErrorKind::Conflict, "DATA_CONFLICT"),
        (500, ErrorKind::Server, "SERVER_ERROR"),
        (502, ErrorKind::Server, "SERVER_ERROR"),
        (503, ErrorKind::Server, "SERVER_ERROR"),
        (504, ErrorKind::Server, "SERVER_ERROR"),
        (418, ErrorKind::Unknown, "UNKNOWN_ERROR"),
        (422, ErrorKind::Unknown, "UNKNOWN_ERROR"),
    ];

    for (status, kind, code) in table {
        let err = classify_status(&json_response(status, "{}"));
        assert_eq!(err.kind, kind, "status {status}");
        assert_eq!(err.status, Some(status));
        assert_eq!(err.code.as_deref(), Some(code));
    }
}

#[test]
fn message_comes_from_body_or_status_line() {
    let with_message = classify_status(&json_response(400, r#"{"message":"Título é obrigatório"}"#));
    assert_eq!(with_message.message, "Título é obrigatório");
    assert_eq!(with_message.to_string(), "Título é obrigatório");

    let plain = classify_status(&text_response(502, "<html>Bad Gateway</html>"));
    assert_eq!(plain.message, "API error: 502 Bad Gateway");

    let non_string = classify_status(&json_response(409, r#"{"message":{"nested":true}}"#));
    assert_eq!(non_string.message, "API error: 409 Conflict");
}

#[test]
fn backend_code_overrides_kind_identifier() {
    let err = classify_status(&json_response(409, r#"{"message":"Already booked","code":"SLOT_TAKEN"}"#));
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.code.as_deref(), Some("SLOT_TAKEN"));

    let err = classify_status(&json_response(400, r#"{"errorCode":"INVALID_PRICE"}"#));
    assert_eq!(err.code.as_deref(), Some("INVALID_PRICE"));
}

#[test]
fn classification_is_idempotent() {
    let resp = json_response(401, r#"{"message":"Token expired"}"#);
    let a = classify_status(&resp);
    let b = classify_status(&resp);

    assert_eq!(a, b);
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
    assert_eq!(a.kind, ErrorKind::AuthTokenExpired);
    assert_eq!(a.message, "Token expired");
}

#[test]
fn transport_failures_by_type() {
    let net = classify_transport(&TransportError::Connect("dns error".into()));
    assert_eq!(net.kind, ErrorKind::Network);
    assert_eq!(net.status, None);
    assert!(net.message.contains("internet connection"));

    let timeout = classify_transport(&TransportError::Timeout("deadline".into()));
    assert_eq!(timeout.kind, ErrorKind::Timeout);

    let body = classify_transport(&TransportError::Body("unexpected EOF".into()));
    assert_eq!(body.kind, ErrorKind::Parse);

    let other = classify_transport(&TransportError::Other("builder error".into()));
    assert_eq!(other.kind, ErrorKind::Unknown);
    assert_eq!(other.message, "builder error");
    assert_eq!(other.code, None);
}

#[tokio::test]
async fn validation_error_end_to_end() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/ofertas");
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"message":"Preço inválido"}"#);
    });

    let client = common::client_for(&server);
    let err = client
        .request::<Value>(ApiRequest::post("/ofertas").body(json!({"preco": -1})))
        .await
        .unwrap_err();

    mock.assert_calls(1);
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Preço inválido");
    assert_eq!(err.status, Some(400));
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/agenda");
        then.status(200)
            .header("content-type", "application/json")
            .body("{not json");
    });

    let err = common::client_for(&server)
        .request::<Value>(ApiRequest::get("/agenda"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.code.as_deref(), Some("PARSE_ERROR"));
}

#[tokio::test]
async fn text_and_empty_bodies() {
    let stub = StubTransport::new(|req, _| match req.url.path() {
        "/ping" => Ok(text_response(200, "pong")),
        _ => Ok(json_response(204, "")),
    });
    let client = common::stub_client(&stub);

    let pong: Value = client.request(ApiRequest::get("/ping")).await.unwrap();
    assert_eq!(pong, Value::String("pong".into()));

    let gone: Value = client
        .request(ApiRequest::delete("/notificacoes/3"))
        .await
        .unwrap();
    assert_eq!(gone, Value::Null);
}

#[tokio::test]
async fn shape_mismatch_is_a_parse_error() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Offer {
        id: String,
        preco: f64,
    }

    let stub = StubTransport::always(200, r#"{"id":"1"}"#);
    let err = common::stub_client(&stub)
        .request::<Offer>(ApiRequest::get("/ofertas/1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Parse);
}

#[tokio::test]
async fn invalid_header_is_rejected_before_sending() {
    let stub = StubTransport::always(200, "{}");
    let err = common::stub_client(&stub)
        .request::<Value>(ApiRequest::get("/x").header("bad header", "v"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(stub.calls(), 0);
}
