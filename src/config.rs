//! Session configuration

use std::env;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::storage::{MemoryStorage, WalletStorage};
use crate::traits::{LogUrlOpener, UrlOpener};
use crate::wallet::WalletDescriptor;

/// Storage key the selected wallet name is persisted under by default
pub const DEFAULT_STORAGE_KEY: &str = "walletName";

pub const WALLET_AUTO_CONNECT: &str = "WALLET_AUTO_CONNECT";
pub const WALLET_STORAGE_KEY: &str = "WALLET_STORAGE_KEY";
pub const WALLET_DEFAULT: &str = "WALLET_DEFAULT";

/// Behavior switches for a [`WalletSessionManager`](crate::WalletSessionManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    /// Connect as soon as a selected wallet reports ready
    pub auto_connect: bool,
    /// Key the selected wallet name is persisted under
    pub storage_key: String,
    /// Wallet to select when nothing was persisted
    pub default_wallet: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            auto_connect: false,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_wallet: None,
        }
    }
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WalletError::ConfigError(format!("Invalid wallet config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `WALLET_AUTO_CONNECT`, `WALLET_STORAGE_KEY` and `WALLET_DEFAULT`,
    /// falling back to defaults for unset variables
    pub fn from_env() -> Result<Self, WalletError> {
        let mut config = Self::default();

        if let Ok(value) = env::var(WALLET_AUTO_CONNECT) {
            config.auto_connect = parse_bool(&value).ok_or_else(|| {
                WalletError::ConfigError(format!(
                    "{WALLET_AUTO_CONNECT} must be true or false, got {value:?}"
                ))
            })?;
        }
        if let Ok(key) = env::var(WALLET_STORAGE_KEY) {
            config.storage_key = key;
        }
        config.default_wallet = env::var(WALLET_DEFAULT).ok().filter(|name| !name.is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_default_wallet(mut self, name: impl Into<String>) -> Self {
        self.default_wallet = Some(name.into());
        self
    }

    fn validate(&self) -> Result<(), WalletError> {
        if self.storage_key.trim().is_empty() {
            return Err(WalletError::ConfigError(
                "storage key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Everything a session manager is constructed from
#[derive(Clone)]
pub struct WalletOptions {
    pub wallets: Vec<WalletDescriptor>,
    pub config: WalletConfig,
    pub storage: Arc<dyn WalletStorage>,
    pub url_opener: Arc<dyn UrlOpener>,
}

impl std::fmt::Debug for WalletOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletOptions")
            .field("wallets", &self.wallets)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WalletOptions {
    /// Options with default config, in-memory storage and a logging URL opener
    pub fn new(wallets: Vec<WalletDescriptor>) -> Self {
        Self {
            wallets,
            config: WalletConfig::default(),
            storage: Arc::new(MemoryStorage::new()),
            url_opener: Arc::new(LogUrlOpener),
        }
    }

    pub fn with_config(mut self, config: WalletConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn WalletStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_url_opener(mut self, url_opener: Arc<dyn UrlOpener>) -> Self {
        self.url_opener = url_opener;
        self
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for var in [WALLET_AUTO_CONNECT, WALLET_STORAGE_KEY, WALLET_DEFAULT] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert!(!config.auto_connect);
        assert_eq!(config.storage_key, "walletName");
        assert_eq!(config.default_wallet, None);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = WalletConfig::from_json(r#"{"autoConnect":true}"#).unwrap();
        assert!(config.auto_connect);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);

        let config =
            WalletConfig::from_json(r#"{"storageKey":"solWallet","defaultWallet":"Phantom"}"#)
                .unwrap();
        assert_eq!(config.storage_key, "solWallet");
        assert_eq!(config.default_wallet.as_deref(), Some("Phantom"));
    }

    #[test]
    fn test_from_json_rejects_empty_storage_key() {
        let result = WalletConfig::from_json(r#"{"storageKey":"  "}"#);
        assert!(matches!(result, Err(WalletError::ConfigError(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    #[serial]
    fn test_from_env_unset_uses_defaults() {
        clear_env();
        assert_eq!(WalletConfig::from_env().unwrap(), WalletConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        clear_env();
        env::set_var(WALLET_AUTO_CONNECT, "yes");
        env::set_var(WALLET_STORAGE_KEY, "solWallet");
        env::set_var(WALLET_DEFAULT, "Phantom");

        let config = WalletConfig::from_env().unwrap();
        assert!(config.auto_connect);
        assert_eq!(config.storage_key, "solWallet");
        assert_eq!(config.default_wallet.as_deref(), Some("Phantom"));

        env::set_var(WALLET_DEFAULT, "");
        assert_eq!(WalletConfig::from_env().unwrap().default_wallet, None);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_values() {
        clear_env();
        env::set_var(WALLET_AUTO_CONNECT, "sometimes");
        let err = WalletConfig::from_env().unwrap_err();
        assert!(matches!(err, WalletError::ConfigError(_)));
        assert!(err.to_string().contains(WALLET_AUTO_CONNECT));

        clear_env();
        env::set_var(WALLET_STORAGE_KEY, " ");
        assert!(matches!(
            WalletConfig::from_env(),
            Err(WalletError::ConfigError(_))
        ));
        clear_env();
    }
}
