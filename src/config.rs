//! Configuration loader for the `airwatch` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::dates::{DateConfig, MST_OFFSET_HOURS};
use crate::devices;
use crate::store::FIREBASE_API_URL;

/// Parse an optional environment variable into `$ty` with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Where measurement files live.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// A local directory laid out as `<interval>/<file>`.
    Local { root: PathBuf },
    /// A Firebase Storage bucket, reached over its REST API.
    Firebase { api_url: String, bucket: String },
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Object store holding the measurement files.
    pub storage: StorageBackend,

    /// Alert decision endpoint.
    pub alert_api_url: String,

    /// Push server device registration endpoint.
    pub apns_server_url: Option<String>,

    /// Device token to register at startup.
    pub device_token: Option<Vec<u8>>,

    /// Whole-hour UTC offset used to read file names.
    pub timezone_offset_hours: i32,

    /// Port the HTTP API listens on.
    pub http_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `ALERT_API_URL` – alert decision endpoint
/// - `STORAGE_BUCKET` – only when `STORAGE_BACKEND=firebase`
///
/// Optional:
/// - `STORAGE_BACKEND` – `local` or `firebase` (default: local)
/// - `STORAGE_ROOT` – local store directory (default: ./measurements)
/// - `FIREBASE_API_URL` – Firebase Storage API base URL
/// - `APNS_SERVER_URL` – push server registration endpoint
/// - `DEVICE_TOKEN` – hex device token, registered when `APNS_SERVER_URL` is set
/// - `TIMEZONE_OFFSET_HOURS` – file name timezone (default: -7, MST)
/// - `HTTP_PORT` – listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let alert_api_url = require_env!("ALERT_API_URL");

    let storage = match env::var("STORAGE_BACKEND").as_deref() {
        Ok("local") | Err(_) => StorageBackend::Local {
            root: parse_env!("STORAGE_ROOT", PathBuf, PathBuf::from("./measurements")),
        },
        Ok("firebase") => StorageBackend::Firebase {
            api_url: env::var("FIREBASE_API_URL").unwrap_or_else(|_| FIREBASE_API_URL.to_string()),
            bucket: require_env!("STORAGE_BUCKET"),
        },
        Ok(other) => return Err(anyhow!("Invalid STORAGE_BACKEND: {}", other)),
    };

    let apns_server_url = env::var("APNS_SERVER_URL").ok();
    let device_token = env::var("DEVICE_TOKEN")
        .ok()
        .map(|hex| devices::decode_token(&hex))
        .transpose()?;

    let timezone_offset_hours = parse_env!("TIMEZONE_OFFSET_HOURS", i32, MST_OFFSET_HOURS);
    let http_port = parse_env!("HTTP_PORT", u16, 8080);

    let config = Config {
        storage,
        alert_api_url,
        apns_server_url,
        device_token,
        timezone_offset_hours,
        http_port,
    };

    // Fail at startup rather than on the first request.
    config.date_config()?;

    Ok(config)
}

impl Config {
    // ---
    pub fn date_config(&self) -> Result<DateConfig> {
        Ok(DateConfig::with_offset_hours(self.timezone_offset_hours)?)
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the device token while showing all other values that were
    /// loaded.
    pub fn log_config(&self) {
        // ---
        let masked_token = match &self.device_token {
            Some(token) => {
                let hex = devices::encode_token(token);
                format!("{}****", &hex[..hex.len().min(4)])
            }
            None => "(none)".to_string(),
        };

        tracing::info!("Configuration loaded:");
        match &self.storage {
            StorageBackend::Local { root } => {
                tracing::info!("  STORAGE_BACKEND       : local");
                tracing::info!("  STORAGE_ROOT          : {}", root.display());
            }
            StorageBackend::Firebase { api_url, bucket } => {
                tracing::info!("  STORAGE_BACKEND       : firebase");
                tracing::info!("  FIREBASE_API_URL      : {}", api_url);
                tracing::info!("  STORAGE_BUCKET        : {}", bucket);
            }
        }
        tracing::info!("  ALERT_API_URL         : {}", self.alert_api_url);
        tracing::info!(
            "  APNS_SERVER_URL       : {}",
            self.apns_server_url.as_deref().unwrap_or("(none)")
        );
        tracing::info!("  DEVICE_TOKEN          : {}", masked_token);
        tracing::info!("  TIMEZONE_OFFSET_HOURS : {}", self.timezone_offset_hours);
        tracing::info!("  HTTP_PORT             : {}", self.http_port);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_config() -> Config {
        // ---
        Config {
            storage: StorageBackend::Local {
                root: PathBuf::from("/tmp/measurements"),
            },
            alert_api_url: "http://localhost:8081/".to_string(),
            apns_server_url: None,
            device_token: Some(vec![0xde, 0xad, 0xbe, 0xef]),
            timezone_offset_hours: -7,
            http_port: 8080,
        }
    }

    #[test]
    fn test_date_config_offset() {
        // ---
        let cfg = create_test_config();
        assert_eq!(cfg.date_config().unwrap().offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_invalid_offset_rejected() {
        // ---
        let cfg = Config {
            timezone_offset_hours: 48,
            ..create_test_config()
        };
        assert!(cfg.date_config().is_err());
    }
}
