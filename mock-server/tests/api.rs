use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

const AUTH: &str = "Basic YWNtZStwdWJrZXk6cHJpdmtleQ==";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header("clientId", "client-123")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/company/contacts")
                .header("clientId", "client-123")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "Unauthorized");
}

#[tokio::test]
async fn missing_client_id_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/company/contacts")
                .header(http::header::AUTHORIZATION, AUTH)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_auth() {
    let resp = app()
        .oneshot(Request::builder().uri("/health").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"ok");
}

// --- contacts ---

#[tokio::test]
async fn list_contacts_empty() {
    let resp = app().oneshot(authed("GET", "/company/contacts", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn create_contact_assigns_id() {
    let resp = app()
        .oneshot(authed("POST", "/company/contacts", r#"{"firstName":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await, json!({"id": 1, "firstName": "Ada"}));
}

#[tokio::test]
async fn create_then_get_patch_delete() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(authed("POST", "/company/contacts", r#"{"firstName":"Ada","lastName":"L"}"#))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_u64().unwrap();

    let resp = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/company/contacts/{id}"),
            r#"[{"op":"replace","path":"lastName","value":"Lovelace"}]"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["lastName"], "Lovelace");

    let resp = app
        .clone()
        .oneshot(authed("GET", &format!("/company/contacts/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["lastName"], "Lovelace");

    let resp = app
        .clone()
        .oneshot(authed("DELETE", &format!("/company/contacts/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app
        .oneshot(authed("GET", &format!("/company/contacts/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "NotFound");
}

#[tokio::test]
async fn put_replaces_contact_but_keeps_id() {
    let app = app();
    app.clone()
        .oneshot(authed("POST", "/company/contacts", r#"{"firstName":"Ada","title":"CTO"}"#))
        .await
        .unwrap();

    let resp = app
        .oneshot(authed("PUT", "/company/contacts/1", r#"{"firstName":"Grace","id":99}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"id": 1, "firstName": "Grace"}));
}

#[tokio::test]
async fn patch_rejects_unknown_op() {
    let app = app();
    app.clone()
        .oneshot(authed("POST", "/company/contacts", r#"{"firstName":"Ada"}"#))
        .await
        .unwrap();

    let resp = app
        .oneshot(authed(
            "PATCH",
            "/company/contacts/1",
            r#"[{"op":"move","path":"firstName","value":"x"}]"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_missing_contact_returns_404() {
    let resp = app()
        .oneshot(authed("DELETE", "/company/contacts/42", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- system ---

#[tokio::test]
async fn echo_reports_headers_and_body() {
    let resp = app()
        .oneshot(authed("POST", "/system/echo?x=1", r#"{"name":"Acme"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo = body_json(resp).await;
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/system/echo");
    assert_eq!(echo["query"], "x=1");
    assert_eq!(echo["authorization"], AUTH);
    assert_eq!(echo["clientId"], "client-123");
    assert_eq!(echo["contentType"], "application/json");
    assert_eq!(echo["body"], json!({"name": "Acme"}));
}

#[tokio::test]
async fn empty_route_has_no_body() {
    let resp = app().oneshot(authed("GET", "/system/empty", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn text_route_is_not_json() {
    let resp = app().oneshot(authed("GET", "/system/text", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}
