//! Configuration loading and management
//!
//! Settings come from a YAML file (every section optional) with
//! `DEVCAMPER_*` environment variables applied on top.

use crate::core::pagination::TotalScope;
use crate::core::query::PageLimits;
use crate::core::results::ListSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the YAML file to load
pub const CONFIG_PATH_VAR: &str = "DEVCAMPER_CONFIG";

/// HTTP listener and routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix every resource route is mounted under
    pub api_prefix: String,
    /// Marks cookies `Secure`
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api/v1".to_string(),
            production: false,
        }
    }
}

/// Token signing and cookie behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_expire_days: i64,
    /// Accept the `token` cookie when no bearer header is sent
    pub cookie_fallback: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            jwt_expire_days: 30,
            cookie_expire_days: 30,
            cookie_fallback: false,
        }
    }
}

/// Page-size bounds and total scope of list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub total_scope: TotalScope,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            default_limit: limits.default_limit,
            max_limit: limits.max_limit,
            total_scope: TotalScope::default(),
        }
    }
}

impl PaginationConfig {
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            limits: PageLimits {
                default_limit: self.default_limit.max(1),
                max_limit: self.max_limit.max(1),
            },
            total_scope: self.total_scope,
        }
    }
}

/// Photo uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    pub path: PathBuf,
    pub max_file_bytes: usize,
    /// Route the upload directory is served under; `None` leaves it unserved
    pub public_route: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./public/uploads"),
            max_file_bytes: 1_000_000,
            public_route: Some("/uploads".to_string()),
        }
    }
}

/// Per-client request budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 600,
        }
    }
}

/// Response hardening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add the standard hardening headers to every response
    pub headers: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            headers: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// SMTP settings; without them mail is only logged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    2525
}

fn default_from_name() -> String {
    "DevCamper".to_string()
}

/// Geocoding provider; without it a fixed geocoder is used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,
    pub api_key: String,
}

fn default_geocoder_url() -> String {
    "https://www.mapquestapi.com/geocoding/v1/address".to_string()
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub uploads: UploadConfig,
    pub security: SecurityConfig,
    pub mail: Option<MailConfig>,
    pub geocoder: Option<GeocoderConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid config file {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `DEVCAMPER_CONFIG` (or defaults) and apply the environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `DEVCAMPER_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("DEVCAMPER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DEVCAMPER_PORT") {
            self.server.port = port.parse().context("DEVCAMPER_PORT must be a port number")?;
        }
        if let Some(production) = lookup("DEVCAMPER_PRODUCTION") {
            self.server.production = parse_flag(&production);
        }
        if let Some(secret) = lookup("DEVCAMPER_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(days) = lookup("DEVCAMPER_JWT_EXPIRE_DAYS") {
            self.auth.jwt_expire_days = days
                .parse()
                .context("DEVCAMPER_JWT_EXPIRE_DAYS must be an integer")?;
        }
        if let Some(days) = lookup("DEVCAMPER_COOKIE_EXPIRE_DAYS") {
            self.auth.cookie_expire_days = days
                .parse()
                .context("DEVCAMPER_COOKIE_EXPIRE_DAYS must be an integer")?;
        }
        if let Some(path) = lookup("DEVCAMPER_UPLOAD_PATH") {
            self.uploads.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("DEVCAMPER_MAX_FILE_UPLOAD") {
            self.uploads.max_file_bytes = max
                .parse()
                .context("DEVCAMPER_MAX_FILE_UPLOAD must be a byte count")?;
        }
        if let Some(enabled) = lookup("DEVCAMPER_RATE_LIMIT") {
            self.security.rate_limit.enabled = parse_flag(&enabled);
        }
        if let Some(max) = lookup("DEVCAMPER_RATE_LIMIT_MAX") {
            self.security.rate_limit.max_requests = max
                .parse()
                .context("DEVCAMPER_RATE_LIMIT_MAX must be a request count")?;
        }
        if let Some(key) = lookup("DEVCAMPER_GEOCODER_API_KEY") {
            match &mut self.geocoder {
                Some(geocoder) => geocoder.api_key = key,
                None => {
                    self.geocoder = Some(GeocoderConfig {
                        base_url: default_geocoder_url(),
                        api_key: key,
                    })
                }
            }
        }
        if let (Some(mail), Some(password)) = (&mut self.mail, lookup("DEVCAMPER_SMTP_PASSWORD")) {
            mail.smtp_password = password;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes" | "production")
}
