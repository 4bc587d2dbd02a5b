//! Configuration loading from daraja-bridge.toml and the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use daraja::DarajaClient;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "daraja-bridge.toml";

/// Read from the working directory when present.
pub const DOTENV_FILE: &str = ".env";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Sandbox provider settings.
    #[serde(default)]
    pub daraja: DarajaConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Daraja sandbox configuration.
#[derive(Deserialize)]
#[serde(default)]
pub struct DarajaConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub shortcode: String,
    pub passkey: String,
    pub base_url: String,
    pub callback_url: String,
    pub request_timeout_secs: u64,
    pub auth_timeout_secs: u64,
}

impl Default for DarajaConfig {
    fn default() -> Self {
        Self {
            consumer_key: None,
            consumer_secret: None,
            shortcode: daraja::SANDBOX_SHORTCODE.to_string(),
            passkey: daraja::SANDBOX_PASSKEY.to_string(),
            base_url: daraja::SANDBOX_BASE_URL.to_string(),
            callback_url: daraja::DEFAULT_CALLBACK_URL.to_string(),
            request_timeout_secs: daraja::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            auth_timeout_secs: daraja::DEFAULT_AUTH_TIMEOUT.as_secs(),
        }
    }
}

impl std::fmt::Debug for DarajaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarajaConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &self.consumer_secret.as_ref().map(|_| "<redacted>"))
            .field("shortcode", &self.shortcode)
            .field("passkey", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("auth_timeout_secs", &self.auth_timeout_secs)
            .finish()
    }
}

/// Log output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Append logs here instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path`, or the default file if present, then apply environment
    /// overrides. Variables from `.env` apply where the process environment
    /// does not set them.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        let dotenv = load_dotenv(Path::new(DOTENV_FILE))?;
        config.apply_env(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        });
        Ok(config)
    }

    /// Override file values with `DARAJA_*` variables. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let daraja = &mut self.daraja;

        if let Some(v) = get("DARAJA_CONSUMER_KEY") {
            daraja.consumer_key = Some(v);
        }
        if let Some(v) = get("DARAJA_CONSUMER_SECRET") {
            daraja.consumer_secret = Some(v);
        }
        if let Some(v) = get("DARAJA_SHORTCODE") {
            daraja.shortcode = v;
        }
        if let Some(v) = get("DARAJA_PASSKEY") {
            daraja.passkey = v;
        }
        if let Some(v) = get("DARAJA_BASE_URL") {
            daraja.base_url = v;
        }
        if let Some(v) = get("DARAJA_CALLBACK_URL") {
            daraja.callback_url = v;
        }
    }

    /// Build the sandbox client.
    ///
    /// Credentials are optional here; authenticated tools fail per request
    /// when they are missing. Setting only one of the pair is an error.
    pub fn client(&self) -> Result<DarajaClient, ConfigError> {
        let daraja = &self.daraja;
        let mut builder = DarajaClient::builder()
            .shortcode(&daraja.shortcode)
            .passkey(&daraja.passkey)
            .base_url(&daraja.base_url)
            .callback_url(&daraja.callback_url)
            .request_timeout(Duration::from_secs(daraja.request_timeout_secs))
            .auth_timeout(Duration::from_secs(daraja.auth_timeout_secs));

        match (&daraja.consumer_key, &daraja.consumer_secret) {
            (Some(key), Some(secret)) => builder = builder.credentials(key, secret),
            (None, None) => {}
            _ => return Err(ConfigError::PartialCredentials),
        }

        builder.build().map_err(ConfigError::Client)
    }

    pub fn has_credentials(&self) -> bool {
        self.daraja.consumer_key.is_some() && self.daraja.consumer_secret.is_some()
    }
}

/// Variables from a dotenv file; empty when the file does not exist.
pub fn load_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)
        .map_err(|e| ConfigError::Dotenv(e.to_string()))?
        .map(|item| item.map_err(|e| ConfigError::Dotenv(e.to_string())))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to read .env: {0}")]
    Dotenv(String),

    #[error(
        "incomplete credentials: set both daraja.consumer_key and daraja.consumer_secret, or neither"
    )]
    PartialCredentials,

    #[error(transparent)]
    Client(daraja::Error),
}
