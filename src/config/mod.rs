//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::util::time::{DEFAULT_TICK_RATE, MAX_TICK_RATE};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of the compact format
    pub log_json: bool,

    /// Allowed client origins for CORS; empty means any origin
    pub client_origins: Vec<String>,

    /// Simulation ticks per second for every session
    pub tick_rate: u32,
    /// Fixed seed for spawn positions, for reproducible runs
    pub spawn_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            log_json: false,
            client_origins: Vec::new(),
            tick_rate: DEFAULT_TICK_RATE,
            spawn_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR so hosted platforms can assign one
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && s != "*")
                    .collect()
            })
            .unwrap_or_default();

        let tick_rate = match lookup("TICK_RATE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|rate| (1..=MAX_TICK_RATE).contains(rate))
                .ok_or(ConfigError::Invalid("TICK_RATE"))?,
            None => DEFAULT_TICK_RATE,
        };

        let spawn_seed = lookup("SPAWN_SEED")
            .map(|raw| raw.parse::<u64>().map_err(|_| ConfigError::Invalid("SPAWN_SEED")))
            .transpose()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: matches!(lookup("LOG_FORMAT").as_deref(), Some("json")),

            client_origins,
            tick_rate,
            spawn_seed,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
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

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.tick_rate, 60);
        assert!(config.client_origins.is_empty());
        assert!(config.spawn_seed.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_port_overrides_server_addr() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("SERVER_ADDR", "127.0.0.1:4000"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr.port(), 9000);
    }

    #[test]
    fn test_origins_and_seed() {
        let config = Config::from_lookup(lookup(&[
            ("CLIENT_ORIGIN", "http://a.test, http://b.test"),
            ("SPAWN_SEED", "42"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.client_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.spawn_seed, Some(42));
        assert!(config.log_json);

        let any = Config::from_lookup(lookup(&[("CLIENT_ORIGIN", "*")])).unwrap();
        assert!(any.client_origins.is_empty());
    }

    #[test]
    fn test_tick_rate_upper_bound() {
        let config = Config::from_lookup(lookup(&[("TICK_RATE", "1000000")])).unwrap();
        assert_eq!(config.tick_rate, MAX_TICK_RATE);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("TICK_RATE", "0")])),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("TICK_RATE", "2000000")])),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("SERVER_ADDR", "nope")])),
            Err(ConfigError::InvalidAddress)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("SPAWN_SEED", "-1")])),
            Err(ConfigError::Invalid("SPAWN_SEED"))
        ));
    }
}
