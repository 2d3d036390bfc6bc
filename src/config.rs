// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`ServiceConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for settings storage | `./data` |
//! | `HOST` | Server bind address | `127.0.0.1` |
//! | `PORT` | Server bind port | `8080` |
//! | `STELLAR_NETWORK` | Initial network context (`test` or `public`) | `test` |
//! | `SAVE_DEBOUNCE_MS` | Debounce window for account list writes | `100` |
//! | `BALANCE_REFRESH_SECS` | Balance refresh interval, `0` disables | `60` |
//! | `SETTINGS_POLL_SECS` | Poll interval for external settings edits | `2` |
//! | `HORIZON_TESTNET_URL` | Horizon endpoint for the test network | SDF testnet |
//! | `HORIZON_PUBLIC_URL` | Horizon endpoint for the public network | SDF pubnet |
//! | `FRIENDBOT_URL` | Friendbot endpoint (test network) | SDF friendbot |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::accounts::ServiceOptions;
use crate::ledger::NetworkContext;
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the settings data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
/// Initial network context; can be switched at runtime through the API.
pub const STELLAR_NETWORK_ENV: &str = "STELLAR_NETWORK";
pub const SAVE_DEBOUNCE_MS_ENV: &str = "SAVE_DEBOUNCE_MS";
pub const BALANCE_REFRESH_SECS_ENV: &str = "BALANCE_REFRESH_SECS";
pub const SETTINGS_POLL_SECS_ENV: &str = "SETTINGS_POLL_SECS";
pub const HORIZON_TESTNET_URL_ENV: &str = "HORIZON_TESTNET_URL";
pub const HORIZON_PUBLIC_URL_ENV: &str = "HORIZON_PUBLIC_URL";
pub const FRIENDBOT_URL_ENV: &str = "FRIENDBOT_URL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BALANCE_REFRESH_SECS: u64 = 60;
pub const DEFAULT_SETTINGS_POLL_SECS: u64 = 2;

/// Service configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub network: NetworkContext,
    /// `None` disables the background balance refresh.
    pub balance_refresh: Option<Duration>,
    pub settings_poll: Duration,
    pub json_logs: bool,
    pub service: ServiceOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_ROOT),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            network: NetworkContext::Test,
            balance_refresh: Some(Duration::from_secs(DEFAULT_BALANCE_REFRESH_SECS)),
            settings_poll: Duration::from_secs(DEFAULT_SETTINGS_POLL_SECS),
            json_logs: false,
            service: ServiceOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let network = match var(STELLAR_NETWORK_ENV) {
            Some(raw) => raw.parse()?,
            None => defaults.network,
        };

        let port = parse_number(&var, PORT_ENV, u64::from(defaults.port))?;
        let port = u16::try_from(port).map_err(|_| format!("{PORT_ENV} out of range: {port}"))?;

        let save_delay_ms = parse_number(
            &var,
            SAVE_DEBOUNCE_MS_ENV,
            defaults.service.save_delay.as_millis() as u64,
        )?;
        let refresh_secs =
            parse_number(&var, BALANCE_REFRESH_SECS_ENV, DEFAULT_BALANCE_REFRESH_SECS)?;
        let poll_secs = parse_number(&var, SETTINGS_POLL_SECS_ENV, DEFAULT_SETTINGS_POLL_SECS)?;

        let service = ServiceOptions {
            save_delay: Duration::from_millis(save_delay_ms),
            horizon_testnet_url: var(HORIZON_TESTNET_URL_ENV)
                .unwrap_or(defaults.service.horizon_testnet_url),
            horizon_public_url: var(HORIZON_PUBLIC_URL_ENV)
                .unwrap_or(defaults.service.horizon_public_url),
            friendbot_url: var(FRIENDBOT_URL_ENV).unwrap_or(defaults.service.friendbot_url),
        };

        Ok(Self {
            data_dir: var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            host: var(HOST_ENV).unwrap_or(defaults.host),
            port,
            network,
            balance_refresh: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
            settings_poll: Duration::from_secs(poll_secs.max(1)),
            json_logs: var(LOG_FORMAT_ENV)
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            service,
        })
    }
}

fn parse_number<F>(var: &F, name: &str, default: u64) -> Result<u64, String>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} must be a non-negative integer, got `{raw}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig, String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.network, NetworkContext::Test);
        assert_eq!(config.service.save_delay, Duration::from_millis(100));
        assert_eq!(config.balance_refresh, Some(Duration::from_secs(60)));
        assert!(!config.json_logs);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATA_DIR", "/var/lib/wallet"),
            ("PORT", "9000"),
            ("STELLAR_NETWORK", "public"),
            ("SAVE_DEBOUNCE_MS", "250"),
            ("BALANCE_REFRESH_SECS", "0"),
            ("HORIZON_PUBLIC_URL", "https://horizon.example.org"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/wallet"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.network, NetworkContext::Public);
        assert_eq!(config.service.save_delay, Duration::from_millis(250));
        assert_eq!(config.balance_refresh, None);
        assert_eq!(config.service.horizon_public_url, "https://horizon.example.org");
        assert!(config.json_logs);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("PORT", "99999")]).is_err());
        assert!(config_from(&[("SAVE_DEBOUNCE_MS", "soon")]).is_err());
        assert!(config_from(&[("STELLAR_NETWORK", "fuji")]).is_err());
    }
}
