use std::env;
use std::fmt;
use std::time::Duration;

use crate::wizard::staging::WIZARD_MAX_UPLOAD_BYTES;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Distinguishes runtime behavior for different stages of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the wizard client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub backend: BackendConfig,
    pub wizard: WizardConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("ADMISSIONS_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/api".to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        let api_token = env::var("ADMISSIONS_API_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let timeout_secs = env::var("ADMISSIONS_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let max_upload_bytes = match env::var("ADMISSIONS_MAX_UPLOAD_MB") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(BYTES_PER_MB))
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => WIZARD_MAX_UPLOAD_BYTES,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            backend: BackendConfig {
                base_url,
                api_token,
                timeout: Duration::from_secs(timeout_secs),
            },
            wizard: WizardConfig { max_upload_bytes },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Connection settings for the admissions REST backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

/// Limits applied while the wizard stages documents.
#[derive(Debug, Clone, Copy)]
pub struct WizardConfig {
    pub max_upload_bytes: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: WIZARD_MAX_UPLOAD_BYTES,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl(String),
    InvalidTimeout,
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl(value) => write!(
                f,
                "ADMISSIONS_API_URL must start with http:// or https:// (found '{value}')"
            ),
            ConfigError::InvalidTimeout => {
                write!(f, "ADMISSIONS_API_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "ADMISSIONS_MAX_UPLOAD_MB must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
