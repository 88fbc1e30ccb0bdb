//! Configuration module for the pinboard bot.
//!
//! Loads configuration from environment variables.

use std::env;

use serde::Deserialize;
use thiserror::Error;

/// Bot running mode
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Where pins are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    MongoDb { uri: String, database: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    // Storage
    pub store: StoreBackend,
}

const DEFAULT_WEBHOOK_PORT: u16 = 8443;
const DEFAULT_DATABASE: &str = "pinboard";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("polling") => BotMode::Polling,
            Some("webhook") => BotMode::Webhook,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "BOT_MODE",
                    value: other.to_string(),
                });
            }
        };

        let webhook_url = var("WEBHOOK_URL");
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let webhook_port = match var("WEBHOOK_PORT") {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "WEBHOOK_PORT",
                value: port,
            })?,
            None => DEFAULT_WEBHOOK_PORT,
        };

        let store = match var("STORE_BACKEND").map(|b| b.to_lowercase()).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("mongodb") | Some("mongo") => StoreBackend::MongoDb {
                uri: required("MONGODB_URI")?,
                database: var("MONGODB_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET"),
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.bot_mode, BotMode::Polling);
        assert_eq!(config.webhook_port, 8443);
        assert_eq!(config.webhook_secret, None);
        assert_eq!(config.store, StoreBackend::Memory);
    }

    #[test]
    fn test_token_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("BOT_TOKEN"));
        assert_eq!(
            load(&[("BOT_TOKEN", "  ")]).unwrap_err(),
            ConfigError::Missing("BOT_TOKEN")
        );
    }

    #[test]
    fn test_webhook_mode() {
        let err = load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "Webhook")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("WEBHOOK_URL"));

        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("BOT_MODE", "webhook"),
            ("WEBHOOK_URL", "https://example.com/hook"),
            ("WEBHOOK_PORT", "9000"),
            ("WEBHOOK_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.bot_mode, BotMode::Webhook);
        assert_eq!(config.webhook_url.as_deref(), Some("https://example.com/hook"));
        assert_eq!(config.webhook_port, 9000);
        assert_eq!(config.webhook_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "push")]),
            Err(ConfigError::Invalid { name: "BOT_MODE", .. })
        ));
        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("WEBHOOK_PORT", "99999")]),
            Err(ConfigError::Invalid { name: "WEBHOOK_PORT", .. })
        ));
        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("STORE_BACKEND", "redis")]),
            Err(ConfigError::Invalid { name: "STORE_BACKEND", .. })
        ));
    }

    #[test]
    fn test_mongodb_backend() {
        let err = load(&[("BOT_TOKEN", "t"), ("STORE_BACKEND", "mongodb")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MONGODB_URI"));

        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("STORE_BACKEND", "mongodb"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
        ])
        .unwrap();

        assert_eq!(
            config.store,
            StoreBackend::MongoDb {
                uri: "mongodb://localhost:27017".to_string(),
                database: "pinboard".to_string(),
            }
        );
    }
}
