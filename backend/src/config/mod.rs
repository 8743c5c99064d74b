//! Configuration management for the HEALER backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: HEALER__)
//!
//! The generation API key may also come from `GEMINI_API_KEY`. Without a key
//! generation is disabled and every request is answered from the fallback
//! catalog.

use anyhow::Result;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable read when no key is configured under `HEALER__AI__API_KEY`
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single HTTP request, generation included
    pub request_timeout_secs: u64,
    /// Sessions untouched for this long are evicted
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,
}

impl AiConfig {
    /// Generation is attempted only when enabled and a key is present
    pub fn generation_enabled(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 120,
                session_ttl_secs: 3600,
                session_sweep_interval_secs: 300,
            },
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with HEALER__ prefix
    /// 4. `GEMINI_API_KEY`, only if no key was set so far
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (HEALER__ prefix)
            // e.g., HEALER__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("HEALER").separator("__"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        if app_config.ai.api_key.is_none() {
            app_config.ai.api_key = env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::new);
        }

        Ok(app_config)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
