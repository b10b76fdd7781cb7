use config::{Config, Environment, File};
use serde::Deserialize;

use crate::payload::DEFAULT_DYNAMIC_BASE_URL;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub dynamic: DynamicSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for a whole multipart request, uploads included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Most payload lines a single bulk upload may contain.
    #[serde(default = "default_max_bulk_lines")]
    pub max_bulk_lines: usize,
}

/// The single account allowed to use the generator.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DynamicSettings {
    #[serde(default = "default_dynamic_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            max_bulk_lines: default_max_bulk_lines(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl Default for DynamicSettings {
    fn default() -> Self {
        Self {
            base_url: default_dynamic_base_url(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_bulk_lines() -> usize {
    500
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

fn default_dynamic_base_url() -> String {
    DEFAULT_DYNAMIC_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Loads `.env`, an optional `configuration.{yaml,toml,json}` in the working
    /// directory, then `QRSTUDIO_*` environment variables (`__` separates
    /// sections, e.g. `QRSTUDIO_SERVER__PORT`).
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(
                Environment::with_prefix("QRSTUDIO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
