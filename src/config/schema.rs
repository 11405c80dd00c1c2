//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the front
//! controller. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::security::codec::UrlStyle;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AlphaConfig {
    /// Application URL, bind address and routing style.
    pub app: AppConfig,

    /// Secure token settings.
    pub security: SecurityConfig,

    /// Pre-dispatch filters.
    pub filters: FiltersConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Public base URL of the application, used to build secure URLs.
    pub url: String,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Build secure URLs as `/tk/<token>` (true) or `?tk=<token>` (false).
    pub use_pretty_urls: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl AppConfig {
    pub fn url_style(&self) -> UrlStyle {
        if self.use_pretty_urls {
            UrlStyle::Path
        } else {
            UrlStyle::Query
        }
    }

    /// Path the application is mounted under, without trailing slash
    /// ("" when mounted at the root).
    pub fn base_path(&self) -> String {
        url::Url::parse(&self.url)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            use_pretty_urls: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Secure token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret for `tk` tokens. Zero-padded or truncated to 32 bytes.
    pub encryption_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            encryption_key: "CHANGE_ME_IN_PRODUCTION_32_BYTES".to_string(),
        }
    }
}

/// Filter chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Filter names in execution order.
    pub order: Vec<String>,

    /// Block requests by user agent.
    pub client_blacklist: BlacklistFilterConfig,

    /// Block requests by source IP.
    pub ip_blacklist: BlacklistFilterConfig,

    /// Block a client + IP pair after repeated bad requests.
    pub client_temp_blacklist: TempBlacklistConfig,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            order: vec![
                "client_blacklist".to_string(),
                "ip_blacklist".to_string(),
                "client_temp_blacklist".to_string(),
            ],
            client_blacklist: BlacklistFilterConfig::default(),
            ip_blacklist: BlacklistFilterConfig::default(),
            client_temp_blacklist: TempBlacklistConfig::default(),
        }
    }
}

/// Static blacklist filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BlacklistFilterConfig {
    pub enabled: bool,

    /// Initial blacklist entries.
    pub entries: Vec<String>,
}

/// Temporary blacklist configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TempBlacklistConfig {
    pub enabled: bool,

    /// Bad requests allowed within the window before blocking.
    pub limit: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for TempBlacklistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 10,
            window_secs: 600,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
