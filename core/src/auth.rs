//! Header construction for ConnectWise API-member authentication.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::ConnectwiseConfig;

pub const AUTHORIZATION: &str = "Authorization";
pub const CLIENT_ID: &str = "clientId";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// `Basic base64("{company}+{public}:{private}")`.
pub fn authorization_header(config: &ConnectwiseConfig) -> String {
    let credentials = format!(
        "{}+{}:{}",
        config.company_name, config.public_key, config.private_key
    );
    format!("Basic {}", STANDARD.encode(credentials))
}

/// Headers sent with every request, in wire order.
pub fn default_headers(config: &ConnectwiseConfig) -> Vec<(String, String)> {
    vec![
        (AUTHORIZATION.to_string(), authorization_header(config)),
        (CLIENT_ID.to_string(), config.client_id.clone()),
        (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
    ]
}
