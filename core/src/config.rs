//! Connection settings for the ConnectWise API.
//!
//! # Design
//! Settings come from a `ConfigProvider`, a key/value lookup using the dotted
//! `connectwise.*` names. They are read once, when a `ConnectwiseConfig` is
//! built, and every required key is checked up front so a missing credential
//! fails at construction instead of producing a malformed request later.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

pub const KEY_URL: &str = "connectwise.url";
pub const KEY_COMPANY_NAME: &str = "connectwise.companyname";
pub const KEY_PUBLIC_KEY: &str = "connectwise.publicKey";
pub const KEY_PRIVATE_KEY: &str = "connectwise.privateKey";
pub const KEY_CLIENT_ID: &str = "connectwise.clientId";
pub const KEY_TIMEOUT_SECS: &str = "connectwise.timeoutSecs";

/// Source of configuration values, looked up by dotted key.
pub trait ConfigProvider {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Reads settings from `CONNECTWISE_*` environment variables.
///
/// `connectwise.publicKey` is looked up as `CONNECTWISE_PUBLIC_KEY`,
/// `connectwise.companyname` as `CONNECTWISE_COMPANYNAME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

impl ConfigProvider for EnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(env_var_name(key)).ok()
    }
}

/// Convert a dotted camelCase key into an upper snake case variable name.
pub fn env_var_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch == '.' {
            name.push('_');
        } else if ch.is_ascii_uppercase() {
            name.push('_');
            name.push(ch);
        } else {
            name.push(ch.to_ascii_uppercase());
        }
    }
    name
}

/// Resolved settings for one ConnectWise tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectwiseConfig {
    pub url: String,
    pub company_name: String,
    pub public_key: String,
    pub private_key: String,
    pub client_id: String,
    /// Whole-request timeout. `None` leaves the transport's default in place.
    pub timeout: Option<Duration>,
}

impl ConnectwiseConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self, ApiError> {
        let timeout = match provider.get(KEY_TIMEOUT_SECS) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };
        Ok(Self {
            url: required(provider, KEY_URL)?,
            company_name: required(provider, KEY_COMPANY_NAME)?,
            public_key: required(provider, KEY_PUBLIC_KEY)?,
            private_key: required(provider, KEY_PRIVATE_KEY)?,
            client_id: required(provider, KEY_CLIENT_ID)?,
            timeout,
        })
    }

    /// Parse a TOML document containing a `[connectwise]` table.
    pub fn from_toml_str(source: &str) -> Result<Self, ApiError> {
        let file: TomlFile =
            toml::from_str(source).map_err(|e| ApiError::InvalidConfig(e.to_string()))?;
        let section = file.connectwise;
        Ok(Self {
            url: section.url,
            company_name: section.company_name,
            public_key: section.public_key,
            private_key: section.private_key,
            client_id: section.client_id,
            timeout: section.timeout_secs.map(Duration::from_secs),
        })
    }
}

impl fmt::Debug for ConnectwiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectwiseConfig")
            .field("url", &self.url)
            .field("company_name", &self.company_name)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn required(provider: &dyn ConfigProvider, key: &str) -> Result<String, ApiError> {
    provider
        .get(key)
        .ok_or_else(|| ApiError::MissingConfig(key.to_string()))
}

fn parse_timeout(raw: &str) -> Result<Duration, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ApiError::InvalidConfig(format!("{KEY_TIMEOUT_SECS}: {e}")))
}

#[derive(Deserialize)]
struct TomlFile {
    connectwise: TomlSection,
}

#[derive(Deserialize)]
struct TomlSection {
    url: String,
    #[serde(rename = "companyname")]
    company_name: String,
    #[serde(rename = "publicKey")]
    public_key: String,
    #[serde(rename = "privateKey")]
    private_key: String,
    #[serde(rename = "clientId")]
    client_id: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}
