use serde::Deserialize;

use crate::error::{AdsError, AdsResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `BIDPILOT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// ENTITY id of the manager account, used when generating access links.
    #[serde(default)]
    pub manager_entity_id: String,
}

/// Login-with-Amazon credentials and token endpoint settings.
///
/// Secret fields default to empty strings so configuration loading never
/// fails on a fresh environment; a blank secret surfaces as an
/// authentication error on first use.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Tokens are treated as expired this many seconds before the
    /// provider-reported expiry.
    #[serde(default = "default_expiry_margin_secs")]
    pub expiry_margin_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default functions
fn default_token_url() -> String {
    "https://api.amazon.com/auth/o2/token".to_string()
}
fn default_expiry_margin_secs() -> i64 {
    60
}
fn default_base_url() -> String {
    "https://advertising-api.amazon.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            redirect_uri: String::new(),
            token_url: default_token_url(),
            expiry_margin_secs: default_expiry_margin_secs(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            api: ApiConfig::default(),
            manager_entity_id: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> AdsResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BIDPILOT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AdsError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| AdsError::Config(e.to_string()))
    }
}
