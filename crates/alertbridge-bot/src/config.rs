//! Application configuration.
//!
//! Loaded from an optional TOML file, then overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alertbridge_broker::{BrokerConfig, DEFAULT_DATA_URL, DEFAULT_TRADING_URL};
use alertbridge_core::{PassphrasePolicy, TimeInForce};
use alertbridge_executor::{OrderRouter, WorkerConfig};
use alertbridge_intake::{DispatchMode, IntakeConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "ALERTBRIDGE_CONFIG";

/// Shared-secret settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require `passphrase` to equal `token`.
    #[serde(default = "default_use_passphrase")]
    pub use_passphrase: bool,
    #[serde(default)]
    pub token: String,
}

fn default_use_passphrase() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            use_passphrase: default_use_passphrase(),
            token: String::new(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("use_passphrase", &self.use_passphrase)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Brokerage connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BrokerSection {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_trading_url")]
    pub trading_url: String,
    #[serde(default = "default_data_url")]
    pub data_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_trading_url() -> String {
    DEFAULT_TRADING_URL.to_string()
}

fn default_data_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            secret_key: String::new(),
            trading_url: default_trading_url(),
            data_url: default_data_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for BrokerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSection")
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .field("trading_url", &self.trading_url)
            .field("data_url", &self.data_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Order shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Shares per order.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

fn default_quantity() -> u32 {
    1
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
            time_in_force: TimeInForce::default(),
        }
    }
}

/// Queue worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSection {
    /// Pause after each alert in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_pacing_ms() -> u64 {
    3_000
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: IntakeConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub broker: BrokerSection,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub worker: WorkerSection,
}

/// Config file to use: CLI flag, then `ALERTBRIDGE_CONFIG`, then the default
/// path if it exists. `None` means built-in defaults.
pub fn resolve_config_path(cli: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = cli {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = Path::new(DEFAULT_CONFIG_PATH);
    default.exists().then(|| default.to_path_buf())
}

impl AppConfig {
    /// Load from `path` (or defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> AppResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TOKEN") {
            self.auth.token = v;
        }
        if let Some(v) = lookup("USE_PASSPHRASE") {
            self.auth.use_passphrase = parse_bool("USE_PASSPHRASE", &v)?;
        }
        if let Some(v) = lookup("DEBUG") {
            self.server.debug = parse_bool("DEBUG", &v)?;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = lookup("DISPATCH_MODE") {
            self.server.mode = v
                .parse::<DispatchMode>()
                .map_err(|e| AppError::Config(format!("DISPATCH_MODE: {e}")))?;
        }
        if let Some(v) = lookup("APCA_API_KEY_ID") {
            self.broker.key_id = v;
        }
        if let Some(v) = lookup("APCA_API_SECRET_KEY") {
            self.broker.secret_key = v;
        }
        if let Some(v) = lookup("APCA_API_BASE_URL") {
            self.broker.trading_url = v;
        }
        if let Some(v) = lookup("APCA_DATA_URL") {
            self.broker.data_url = v;
        }
        if let Some(v) = lookup("ORDER_QTY") {
            self.order.quantity = parse_number("ORDER_QTY", &v)?;
        }
        if let Some(v) = lookup("PACING_MS") {
            self.worker.pacing_ms = parse_number("PACING_MS", &v)?;
        }
        Ok(())
    }

    /// Fail fast on settings that cannot work.
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.use_passphrase && self.auth.token.is_empty() {
            return Err(AppError::Config(
                "passphrase enforcement is on but TOKEN is empty".to_string(),
            ));
        }
        if self.broker.key_id.is_empty() || self.broker.secret_key.is_empty() {
            return Err(AppError::Config(
                "APCA_API_KEY_ID and APCA_API_SECRET_KEY are required".to_string(),
            ));
        }
        if self.order.quantity == 0 {
            return Err(AppError::Config("order quantity must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn passphrase_policy(&self) -> PassphrasePolicy {
        if self.auth.use_passphrase {
            PassphrasePolicy::Enforced(self.auth.token.clone())
        } else {
            PassphrasePolicy::Disabled
        }
    }

    pub fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            key_id: self.broker.key_id.clone(),
            secret_key: self.broker.secret_key.clone(),
            trading_url: self.broker.trading_url.clone(),
            data_url: self.broker.data_url.clone(),
            timeout: Duration::from_millis(self.broker.timeout_ms),
        }
    }

    pub fn router(&self) -> OrderRouter {
        OrderRouter::new(self.order.quantity, self.order.time_in_force)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            pacing: Duration::from_millis(self.worker.pacing_ms),
        }
    }
}

/// Accepts true/false, 1/0, yes/no, on/off in any case.
fn parse_bool(key: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!("{key}: not a boolean: {other:?}"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("TOKEN", "T"),
                ("APCA_API_KEY_ID", "key"),
                ("APCA_API_SECRET_KEY", "secret"),
            ]))
            .unwrap();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 10000);
        assert!(!config.server.debug);
        assert_eq!(config.server.mode, DispatchMode::Queued);
        assert!(config.auth.use_passphrase);
        assert_eq!(config.order.quantity, 1);
        assert_eq!(config.order.time_in_force, TimeInForce::GoodTillCanceled);
        assert_eq!(config.worker.pacing_ms, 3000);
        assert_eq!(config.broker.timeout_ms, 10_000);
    }

    #[test]
    fn test_parse_toml_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080
            dispatch_mode = "immediate"

            [auth]
            use_passphrase = false

            [order]
            quantity = 10
            time_in_force = "day"

            [worker]
            pacing_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.mode, DispatchMode::Immediate);
        assert!(!config.auth.use_passphrase);
        assert_eq!(config.order.quantity, 10);
        assert_eq!(config.order.time_in_force, TimeInForce::Day);
        assert_eq!(config.worker_config().pacing, Duration::from_millis(500));
        assert_eq!(config.broker.trading_url, DEFAULT_TRADING_URL);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("TOKEN", "T"),
                ("USE_PASSPHRASE", "True"),
                ("DEBUG", "yes"),
                ("PORT", "9000"),
                ("APCA_API_BASE_URL", "https://api.alpaca.markets"),
                ("ORDER_QTY", "3"),
                ("PACING_MS", "250"),
                ("DISPATCH_MODE", "immediate"),
            ]))
            .unwrap();

        assert_eq!(config.auth.token, "T");
        assert!(config.auth.use_passphrase);
        assert!(config.server.debug);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.broker.trading_url, "https://api.alpaca.markets");
        assert_eq!(config.order.quantity, 3);
        assert_eq!(config.worker.pacing_ms, 250);
        assert_eq!(config.server.mode, DispatchMode::Immediate);
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(lookup(&[("PORT", "http")])).is_err());
        assert!(config.apply_overrides(lookup(&[("DEBUG", "maybe")])).is_err());
        assert!(config.apply_overrides(lookup(&[("DISPATCH_MODE", "later")])).is_err());
    }

    #[test]
    fn test_parse_bool_variants() {
        for v in ["true", "True", "TRUE", "1", "yes", "on"] {
            assert!(parse_bool("X", v).unwrap(), "{v}");
        }
        for v in ["false", "False", "0", "no", "off", ""] {
            assert!(!parse_bool("X", v).unwrap(), "{v}");
        }
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.auth.token.clear();
        assert!(config.validate().is_err());
        config.auth.use_passphrase = false;
        assert!(config.validate().is_ok());

        let mut config = valid();
        config.broker.secret_key.clear();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.order.quantity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_passphrase_policy() {
        assert_eq!(
            valid().passphrase_policy(),
            PassphrasePolicy::Enforced("T".to_string())
        );
        let mut config = valid();
        config.auth.use_passphrase = false;
        assert_eq!(config.passphrase_policy(), PassphrasePolicy::Disabled);
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("pacing_ms"));
        assert!(toml_str.contains("dispatch_mode"));
    }

    #[test]
    fn test_shipped_default_file_matches_defaults() {
        let config =
            AppConfig::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.server.mode, defaults.server.mode);
        assert_eq!(config.auth.use_passphrase, defaults.auth.use_passphrase);
        assert!(config.auth.token.is_empty());
        assert_eq!(config.broker.trading_url, defaults.broker.trading_url);
        assert_eq!(config.broker.data_url, defaults.broker.data_url);
        assert_eq!(config.order.quantity, defaults.order.quantity);
        assert_eq!(config.worker.pacing_ms, defaults.worker.pacing_ms);
    }

    #[test]
    fn test_dispatch_mode_alias_in_toml() {
        let config = AppConfig::from_toml_str("[server]\ndispatch_mode = \"sync\"\n").unwrap();
        assert_eq!(config.server.mode, DispatchMode::Immediate);
    }

    #[test]
    fn test_cli_path_wins() {
        assert_eq!(
            resolve_config_path(Some("custom.toml")),
            Some(PathBuf::from("custom.toml"))
        );
    }
}
