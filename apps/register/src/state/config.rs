//! # Configuration State
//!
//! Register configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`ADEGA_*`)
//! 2. Config file (`register.toml`)
//! 3. Defaults (this file)
//!
//! ## Configuration File Format
//! ```toml
//! # register.toml
//! [store]
//! name = "PDV Adegas"
//!
//! [payment]
//! processing_delay_ms = 2000
//! pix_payload = "00020126360014BR.GOV.BCB.PIX0114+5519999999999"
//!
//! [catalog]
//! low_stock_threshold = 10
//!
//! [auth]
//! min_password_length = 6
//! ```
//!
//! Read-only after startup, so `ConfigState` shares it behind an `Arc`
//! without a lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use adega_core::{DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_PIX_PAYLOAD, MIN_PASSWORD_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid register configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// Shop identity shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "PDV Adegas".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// Simulated gateway behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// How long "Processando..." lasts before approval (milliseconds).
    #[serde(default = "default_processing_delay")]
    pub processing_delay_ms: u64,

    /// PIX "copia e cola" payload under the QR placeholder.
    #[serde(default = "default_pix_payload")]
    pub pix_payload: String,
}

fn default_processing_delay() -> u64 {
    2000
}

fn default_pix_payload() -> String {
    DEFAULT_PIX_PAYLOAD.to_string()
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            processing_delay_ms: default_processing_delay(),
            pix_payload: default_pix_payload(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Stock below this is badged "Baixo".
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

fn default_min_password_length() -> usize {
    MIN_PASSWORD_LENGTH
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            min_password_length: default_min_password_length(),
        }
    }
}

// =============================================================================
// Register Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub payment: PaymentSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

impl RegisterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`register.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading register config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load register config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        if self.payment.pix_payload.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "payment.pix_payload must not be empty".into(),
            ));
        }

        if self.catalog.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "catalog.low_stock_threshold must not be negative".into(),
            ));
        }

        if self.auth.min_password_length == 0 {
            return Err(ConfigError::Invalid(
                "auth.min_password_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("ADEGA_STORE_NAME") {
            self.store.name = name;
        }

        if let Ok(delay) = std::env::var("ADEGA_PAYMENT_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => {
                    debug!(delay_ms = ms, "Overriding payment delay from environment");
                    self.payment.processing_delay_ms = ms;
                }
                Err(_) => warn!(value = %delay, "Ignoring invalid ADEGA_PAYMENT_DELAY_MS"),
            }
        }

        if let Ok(payload) = std::env::var("ADEGA_PIX_PAYLOAD") {
            self.payment.pix_payload = payload;
        }

        if let Ok(threshold) = std::env::var("ADEGA_LOW_STOCK_THRESHOLD") {
            if let Ok(t) = threshold.parse::<i64>() {
                self.catalog.low_stock_threshold = t;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "adegas", "pdv")
            .map(|dirs| dirs.config_dir().join("register.toml"))
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.payment.processing_delay_ms)
    }
}

// =============================================================================
// Config State
// =============================================================================

/// Shared, read-only configuration handle.
#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    config: Arc<RegisterConfig>,
}

impl ConfigState {
    pub fn new(config: RegisterConfig) -> Self {
        ConfigState {
            config: Arc::new(config),
        }
    }

    pub fn get(&self) -> &RegisterConfig {
        &self.config
    }
}
