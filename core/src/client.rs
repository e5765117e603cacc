//! Request builder, response decoder and blocking facade for the ConnectWise API.
//!
//! # Design
//! `ConnectwiseClient` is built once from a `ConnectwiseConfig` and owns its
//! transport. Each call is split into `build_request` (pure), the transport
//! round-trip, and `parse_response` (pure). `request` composes the three.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth;
use crate::config::{ConfigProvider, ConnectwiseConfig};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Which methods carry a JSON payload when one is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPolicy {
    /// Only POST sends a body; any body passed with another verb is dropped.
    #[default]
    PostOnly,
    /// POST, PUT, PATCH and DELETE send a body. GET, HEAD and OPTIONS never do.
    WriteMethods,
}

impl BodyPolicy {
    pub fn allows(&self, method: HttpMethod) -> bool {
        match self {
            BodyPolicy::PostOnly => method == HttpMethod::Post,
            BodyPolicy::WriteMethods => matches!(
                method,
                HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete
            ),
        }
    }
}

/// Blocking client for one ConnectWise tenant.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct ConnectwiseClient {
    config: ConnectwiseConfig,
    body_policy: BodyPolicy,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ConnectwiseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectwiseClient")
            .field("config", &self.config)
            .field("body_policy", &self.body_policy)
            .finish_non_exhaustive()
    }
}

impl ConnectwiseClient {
    pub fn new(config: ConnectwiseConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ConnectwiseConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            body_policy: BodyPolicy::default(),
            transport: Arc::new(transport),
        }
    }

    pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self, ApiError> {
        Ok(Self::new(ConnectwiseConfig::from_provider(provider)?))
    }

    pub fn with_body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    pub fn config(&self) -> &ConnectwiseConfig {
        &self.config
    }

    pub fn body_policy(&self) -> BodyPolicy {
        self.body_policy
    }

    /// Describe the call as plain data. The endpoint is appended to the
    /// configured base URL verbatim.
    ///
    /// A body is attached only when the client's `BodyPolicy` allows it for
    /// `method`. `None` and JSON `null` both mean "no payload".
    pub fn build_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let attach = self.body_policy.allows(method);
        if !attach && body.is_some_and(|value| !value.is_null()) {
            warn!(%method, endpoint, policy = ?self.body_policy, "dropping request body not allowed by body policy");
        }
        self.build(endpoint, method, body, attach)
    }

    fn build(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
        attach: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = match body {
            Some(value) if attach && !value.is_null() => Some(
                serde_json::to_string(value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.config.url, endpoint),
            headers: auth::default_headers(&self.config),
            body,
        })
    }

    /// Decode a response body into JSON, mapping non-2xx statuses to errors.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        self.parse_response_as(response)
    }

    /// Like `parse_response`, decoding straight into `T`. A failed decode
    /// keeps the response body exactly as received.
    pub fn parse_response_as<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        let decoded = if response.body.trim().is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_str(&response.body)
        };
        decoded.map_err(|e| ApiError::Decode {
            message: e.to_string(),
            body: response.body,
        })
    }

    /// Perform one blocking call and return the decoded JSON.
    pub fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.request_as(endpoint, method, body)
    }

    /// Like `request`, decoding the payload into `T`.
    pub fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let request = self.build_request(endpoint, method, body)?;
        self.send(&request)
    }

    fn send<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T, ApiError> {
        debug!(
            method = %request.method,
            url = %request.url,
            has_body = request.body.is_some(),
            "sending ConnectWise request"
        );

        let response = self.transport.execute(request).inspect_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "ConnectWise request failed");
        })?;
        debug!(status = response.status, bytes = response.body.len(), "ConnectWise response received");

        self.parse_response_as(response).inspect_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "ConnectWise response rejected");
        })
    }

    pub fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Get, None)
    }

    pub fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.send_with_body(endpoint, HttpMethod::Post, body)
    }

    /// PUT with `body` attached whatever the client's `BodyPolicy`.
    pub fn put<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.send_with_body(endpoint, HttpMethod::Put, body)
    }

    /// PATCH with `body` attached whatever the client's `BodyPolicy`.
    pub fn patch<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.send_with_body(endpoint, HttpMethod::Patch, body)
    }

    pub fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Delete, None)
    }

    fn send_with_body<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: &T,
    ) -> Result<Value, ApiError> {
        let body = to_json(body)?;
        let request = self.build(endpoint, method, Some(&body), true)?;
        self.send(&request)
    }
}

fn to_json<T: Serialize + ?Sized>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
