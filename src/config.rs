use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Loaded once at startup:
// 1. Defaults (every section is optional)
// 2. TOML file, when one is given
// 3. Environment overrides (ESS_*, OAUTH_*)
// 4. Validation
//
// ============================================================================

/// Upper bound for session and OAuth state lifetimes
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub docs: DocsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker threads; 0 uses the number of physical cores
    #[serde(default)]
    pub workers: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// EnvFilter directive used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// OAuth2 authorization-code provider settings (Google by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthSettings {
    /// When disabled, every protected route is open and /login skips the provider
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Timeout for the token endpoint call
    #[serde(default = "default_token_timeout_secs")]
    pub token_timeout_secs: u64,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider_name: default_provider_name(),
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            redirect_url: default_redirect_url(),
            scopes: default_scopes(),
            session_ttl_secs: default_session_ttl_secs(),
            state_ttl_secs: default_state_ttl_secs(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            token_timeout_secs: default_token_timeout_secs(),
        }
    }
}

/// `info` block of the generated OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsSettings {
    #[serde(default = "default_docs_title")]
    pub title: String,
    #[serde(default = "default_docs_version")]
    pub version: String,
    #[serde(default = "default_docs_summary")]
    pub summary: String,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            title: default_docs_title(),
            version: default_docs_version(),
            summary: default_docs_summary(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_filter() -> String {
    "info,entity_store_server=debug".to_string()
}

fn default_provider_name() -> String {
    "google".to_string()
}

fn default_authorize_url() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_url() -> String {
    "https://accounts.google.com/o/oauth2/token".to_string()
}

fn default_redirect_url() -> String {
    "http://localhost:8080/callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/userinfo.profile".to_string()]
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_state_ttl_secs() -> u64 {
    600
}

fn default_cookie_name() -> String {
    "ess_session".to_string()
}

fn default_token_timeout_secs() -> u64 {
    10
}

fn default_docs_title() -> String {
    "OpenAPI example".to_string()
}

fn default_docs_version() -> String {
    "2.1".to_string()
}

fn default_docs_summary() -> String {
    "This is a sample API".to_string()
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply the process
    /// environment and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML file without applying overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ESS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ESS_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("ESS_PORT is not a valid port: {}", port))?;
        }
        if let Some(port) = lookup("ESS_METRICS_PORT") {
            self.metrics.port = port
                .parse()
                .with_context(|| format!("ESS_METRICS_PORT is not a valid port: {}", port))?;
        }
        if let Some(client_id) = lookup("OAUTH_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }
        if let Some(client_secret) = lookup("OAUTH_CLIENT_SECRET") {
            self.oauth.client_secret = client_secret;
        }
        if let Some(redirect_url) = lookup("OAUTH_REDIRECT_URL") {
            self.oauth.redirect_url = redirect_url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port cannot be 0");
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                bail!("Metrics port cannot be 0");
            }
            if self.metrics.port == self.server.port && self.metrics.host == self.server.host {
                bail!(
                    "Metrics server and application server cannot share {}:{}",
                    self.server.host,
                    self.server.port
                );
            }
        }

        for (name, secs) in [
            ("session_ttl_secs", self.oauth.session_ttl_secs),
            ("state_ttl_secs", self.oauth.state_ttl_secs),
        ] {
            if secs > MAX_TTL_SECS {
                bail!("oauth.{} cannot exceed {} seconds (one year)", name, MAX_TTL_SECS);
            }
        }

        if self.oauth.enabled {
            if self.oauth.client_id.is_empty() {
                bail!("oauth.client_id is required when OAuth is enabled (or set OAUTH_CLIENT_ID)");
            }
            for (name, url) in [
                ("authorize_url", &self.oauth.authorize_url),
                ("token_url", &self.oauth.token_url),
                ("redirect_url", &self.oauth.redirect_url),
            ] {
                reqwest::Url::parse(url)
                    .with_context(|| format!("oauth.{} is not a valid URL: {}", name, url))?;
            }
            if self.oauth.session_ttl_secs == 0 || self.oauth.state_ttl_secs == 0 {
                bail!("oauth session and state TTLs must be positive");
            }
            if self.oauth.cookie_name.is_empty() {
                bail!("oauth.cookie_name cannot be empty");
            }
        }

        Ok(())
    }
}
