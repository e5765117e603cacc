//! In-memory stand-in for the ConnectWise Manage REST API.
//!
//! Covers the handful of routes the client tests need: contact CRUD, an echo
//! route that reports what it received, and two routes with non-JSON bodies.
//! Every route except `/health` requires `Authorization: Basic ...` and a
//! `clientId` header.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Default)]
pub struct Store {
    next_id: u64,
    contacts: BTreeMap<u64, Map<String, Value>>,
}

pub type Db = Arc<RwLock<Store>>;

/// One JSON Patch operation, as ConnectWise accepts on PATCH.
#[derive(Debug, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/company/contacts", get(list_contacts).post(create_contact))
        .route(
            "/company/contacts/{id}",
            get(get_contact)
                .put(replace_contact)
                .patch(patch_contact)
                .delete(delete_contact),
        )
        .route("/system/info", get(system_info))
        .route("/system/echo", any(echo))
        .route("/system/empty", get(empty))
        .route("/system/text", get(text))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(db);
    Router::new().route("/health", get(health)).merge(api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

async fn require_auth(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic ") && v.len() > "Basic ".len());
    let client_id = headers
        .get("clientId")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty());

    if !basic || !client_id {
        tracing::debug!(basic, client_id, "rejecting unauthenticated request");
        return error_body(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Basic authorization and clientId headers are required",
        );
    }
    next.run(request).await
}

async fn health() -> &'static str {
    "ok"
}

async fn list_contacts(State(db): State<Db>) -> Json<Vec<Map<String, Value>>> {
    let store = db.read().await;
    Json(store.contacts.values().cloned().collect())
}

async fn create_contact(
    State(db): State<Db>,
    Json(mut input): Json<Map<String, Value>>,
) -> (StatusCode, Json<Map<String, Value>>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    input.insert("id".to_string(), json!(id));
    store.contacts.insert(id, input.clone());
    (StatusCode::CREATED, Json(input))
}

async fn get_contact(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.contacts.get(&id) {
        Some(contact) => Json(contact.clone()).into_response(),
        None => not_found(id),
    }
}

async fn replace_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(mut input): Json<Map<String, Value>>,
) -> Response {
    let mut store = db.write().await;
    match store.contacts.get_mut(&id) {
        Some(contact) => {
            input.insert("id".to_string(), json!(id));
            *contact = input;
            Json(contact.clone()).into_response()
        }
        None => not_found(id),
    }
}

async fn patch_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> Response {
    let mut store = db.write().await;
    let Some(contact) = store.contacts.get_mut(&id) else {
        return not_found(id);
    };
    let mut patched = contact.clone();
    for op in ops {
        let field = op.path.trim_start_matches('/');
        if field == "id" {
            return error_body(StatusCode::BAD_REQUEST, "InvalidObject", "id is read-only");
        }
        match op.op.as_str() {
            "replace" | "add" => {
                patched.insert(field.to_string(), op.value);
            }
            "remove" => {
                patched.remove(field);
            }
            other => {
                let message = format!("unsupported patch op `{other}`");
                return error_body(StatusCode::BAD_REQUEST, "InvalidObject", &message);
            }
        }
    }
    *contact = patched;
    Json(contact.clone()).into_response()
}

async fn delete_contact(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    match store.contacts.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(id),
    }
}

fn not_found(id: u64) -> Response {
    let message = format!("Contact with id {id} not found");
    error_body(StatusCode::NOT_FOUND, "NotFound", &message)
}

async fn system_info() -> Json<Value> {
    Json(json!({ "version": "v2024.1.0", "isCloud": false, "serverTimeZone": "UTC" }))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::Null)
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": header("authorization"),
        "clientId": header("clientid"),
        "contentType": header("content-type"),
        "hasBody": !body.is_empty(),
        "body": parsed,
    }))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn text() -> &'static str {
    "this is not json"
}
