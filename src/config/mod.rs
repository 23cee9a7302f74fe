//! Configuration module for the ID-photo service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;
use url::Url;

use crate::domain::DEFAULT_MAX_UPLOAD_BYTES;
use crate::engine::DEFAULT_PRODUCT_NAME;
use crate::providers::{DEFAULT_PROVIDER_TIMEOUT, REMOVAL_AI_ENDPOINT, REMOVE_BG_ENDPOINT};

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub export: ExportSettings,
    pub sessions: SessionSettings,
    pub providers: ProvidersSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Upload limits
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_bytes: usize,
}

/// Export naming
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    pub product_name: String,
}

/// Session lifetime
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Sessions untouched for this long are dropped with their images
    pub idle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

/// Background-removal provider chain
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersSettings {
    /// Upper bound for one provider call, including the response body
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// remove.bg
    pub primary: ProviderSettings,
    /// removal.ai
    pub secondary: ProviderSettings,
}

/// A single provider endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub rate_limit_per_minute: u32,
}

impl ProviderSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with IDPHOTO_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("upload.max_bytes", defaults.upload.max_bytes as i64)?
            .set_default("export.product_name", defaults.export.product_name)?
            .set_default("sessions.idle_ttl_secs", defaults.sessions.idle_ttl_secs as i64)?
            .set_default("sessions.sweep_interval_secs", defaults.sessions.sweep_interval_secs as i64)?
            .set_default("providers.timeout_secs", defaults.providers.timeout_secs as i64)?
            .set_default("providers.connect_timeout_secs", defaults.providers.connect_timeout_secs as i64)?
            .set_default("providers.primary.endpoint", defaults.providers.primary.endpoint)?
            .set_default("providers.primary.rate_limit_per_minute", defaults.providers.primary.rate_limit_per_minute as i64)?
            .set_default("providers.secondary.endpoint", defaults.providers.secondary.endpoint)?
            .set_default("providers.secondary.rate_limit_per_minute", defaults.providers.secondary.rate_limit_per_minute as i64)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (IDPHOTO_PROVIDERS__PRIMARY__API_KEY, etc.)
            .add_source(
                Environment::with_prefix("IDPHOTO")
                    .separator("__")
                    .try_parsing(true)
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Message("upload.max_bytes must be positive".to_string()));
        }
        if self.sessions.idle_ttl_secs == 0 || self.sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::Message("sessions.idle_ttl_secs and sessions.sweep_interval_secs must be positive".to_string()));
        }
        if self.providers.timeout_secs == 0 {
            return Err(ConfigError::Message("providers.timeout_secs must be positive".to_string()));
        }
        for (name, provider) in [("primary", &self.providers.primary), ("secondary", &self.providers.secondary)] {
            Url::parse(&provider.endpoint).map_err(|e| {
                ConfigError::Message(format!("providers.{}.endpoint '{}' is invalid: {}", name, provider.endpoint, e))
            })?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
            },
            upload: UploadSettings {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            export: ExportSettings {
                product_name: DEFAULT_PRODUCT_NAME.to_string(),
            },
            sessions: SessionSettings {
                idle_ttl_secs: 30 * 60,
                sweep_interval_secs: 60,
            },
            providers: ProvidersSettings {
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT.as_secs(),
                connect_timeout_secs: 10,
                primary: ProviderSettings {
                    endpoint: REMOVE_BG_ENDPOINT.to_string(),
                    api_key: None,
                    rate_limit_per_minute: 50,
                },
                secondary: ProviderSettings {
                    endpoint: REMOVAL_AI_ENDPOINT.to_string(),
                    api_key: None,
                    rate_limit_per_minute: 50,
                },
            },
        }
    }
}
