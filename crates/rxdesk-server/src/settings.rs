//! Server settings.
//!
//! Loaded in priority order (highest first):
//! 1. Environment variables (`RXDESK_` prefix, `__` between sections)
//! 2. `config/{env}.toml`
//! 3. `config/default.toml`
//! 4. Built-in defaults

use config::{Config, Environment, File};
use rxdesk_core::roster::DEFAULT_DOCTORS;
use rxdesk_core::MissingRecordPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted when `llm.api_key` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Language model connection
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    /// Decision-tree risk model
    #[serde(default)]
    pub risk: RiskConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Doctors shown on the listing page
    #[serde(default = "default_doctors")]
    pub doctors: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            ocr: OcrConfig::default(),
            risk: RiskConfig::default(),
            chat: ChatConfig::default(),
            logging: LoggingConfig::default(),
            doctors: default_doctors(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted prescription upload
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, created on first use
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_command")]
    pub command: String,
    #[serde(default = "default_ocr_args")]
    pub args: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: default_ocr_command(),
            args: default_ocr_args(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tree JSON; the bundled model is used when unset
    #[serde(default)]
    pub model_path: Option<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatConfig {
    #[serde(default)]
    pub missing_record: MissingRecordPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
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
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_db_path() -> String {
    "hospital.db".to_string()
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_llm_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_ocr_command() -> String {
    "tesseract".to_string()
}

fn default_ocr_args() -> Vec<String> {
    ["--oem", "3", "--psm", "6"].iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_doctors() -> Vec<String> {
    DEFAULT_DOCTORS.iter().map(|d| d.to_string()).collect()
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                message: "Database path must not be empty".to_string(),
            });
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    /// Configured API key, falling back to `GEMINI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Load settings from files and the environment, then validate.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("RXDESK")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.database.path, "hospital.db");
        assert_eq!(settings.ocr.args, vec!["--oem", "3", "--psm", "6"]);
        assert!(settings.risk.enabled);
        assert_eq!(settings.doctors.len(), 10);
        assert_eq!(settings.chat.missing_record, MissingRecordPolicy::FallThrough);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.database.path = " ".into();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.llm.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            doctors = ["Dr. Who (Time)"]

            [server]
            port = 8088

            [chat]
            missing_record = "report"
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.chat.missing_record, MissingRecordPolicy::Report);
        assert_eq!(settings.doctors, vec!["Dr. Who (Time)".to_string()]);
        assert_eq!(settings.llm.model, "gemini-flash-latest");
    }

    #[test]
    fn test_configured_api_key_wins() {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("from-config".into());
        assert_eq!(settings.api_key().as_deref(), Some("from-config"));
    }
}
