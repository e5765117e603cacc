//! Blocking client for the ConnectWise Manage REST API.
//!
//! # Overview
//! `ConnectwiseClient::request` sends one authenticated call (endpoint,
//! method, optional JSON body) and returns the decoded JSON payload, or an
//! `ApiError` saying which stage failed.
//!
//! # Design
//! - Configuration is read once into a `ConnectwiseConfig` from any
//!   `ConfigProvider` (in-memory map, environment, TOML).
//! - The client owns its `Transport`; there is no process-wide state.
//! - Each call is split into `build_request` and `parse_response`, both pure,
//!   so request shape and decoding are tested without a network.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{BodyPolicy, ConnectwiseClient};
pub use config::{ConfigProvider, ConnectwiseConfig, EnvProvider};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
