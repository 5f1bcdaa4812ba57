//! Client configuration.
//!
//! A `ClientConfig` starts from the service defaults and is adjusted by an
//! ordered list of `ClientOption`s; when two options touch the same setting
//! the later one wins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::transport::Transport;

pub const DEFAULT_ENDPOINT: &str = "https://api.what3words.com/v3";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const ENV_API_KEY: &str = "W3W_API_KEY";
pub const ENV_LANGUAGE: &str = "W3W_LANGUAGE";
pub const ENV_ENDPOINT: &str = "W3W_ENDPOINT";

/// A single configuration override.
#[derive(Clone)]
pub enum ClientOption {
    /// Language used for addresses when a call does not override it.
    Language(String),
    /// Base URL the endpoint paths are appended to.
    Endpoint(Url),
    /// Whole-call timeout for the default transport. Ignored when a custom
    /// transport is supplied. A per-call deadline from
    /// `What3WordsClient::with_timeout` takes precedence.
    Timeout(Duration),
    Transport(Arc<dyn Transport>),
}

impl ClientOption {
    pub fn language(language: impl Into<String>) -> Self {
        ClientOption::Language(language.into())
    }

    /// Parse `endpoint` into an `Endpoint` option.
    pub fn endpoint(endpoint: &str) -> Result<Self, ConfigError> {
        parse_endpoint(endpoint).map(ClientOption::Endpoint)
    }

    pub fn transport(transport: impl Transport + 'static) -> Self {
        ClientOption::Transport(Arc::new(transport))
    }
}

impl fmt::Debug for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientOption::Language(l) => f.debug_tuple("Language").field(l).finish(),
            ClientOption::Endpoint(u) => f.debug_tuple("Endpoint").field(&u.as_str()).finish(),
            ClientOption::Timeout(t) => f.debug_tuple("Timeout").field(t).finish(),
            ClientOption::Transport(_) => f.write_str("Transport(..)"),
        }
    }
}

/// Settings a `What3WordsClient` is built from.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub language: String,
    pub endpoint: Url,
    pub timeout: Option<Duration>,
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    /// Defaults for `api_key`: English, the production endpoint, and the
    /// default transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            endpoint: default_endpoint(),
            timeout: None,
            transport: None,
        }
    }

    /// Read `W3W_API_KEY` (required), `W3W_LANGUAGE` and `W3W_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingEnv(ENV_API_KEY))?;
        let mut config = Self::new(api_key);
        if let Some(language) = lookup(ENV_LANGUAGE).filter(|l| !l.is_empty()) {
            config.apply(ClientOption::Language(language));
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|e| !e.is_empty()) {
            config.apply(ClientOption::endpoint(&endpoint)?);
        }
        Ok(config)
    }

    pub fn apply(&mut self, option: ClientOption) {
        match option {
            ClientOption::Language(language) => self.language = language,
            ClientOption::Endpoint(endpoint) => self.endpoint = endpoint,
            ClientOption::Timeout(timeout) => self.timeout = Some(timeout),
            ClientOption::Transport(transport) => self.transport = Some(transport),
        }
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = ClientOption>) -> Self {
        for option in options {
            self.apply(option);
        }
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "URL cannot have paths appended".to_string(),
        });
    }
    Ok(url)
}
