// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher configuration. The CLI surface takes no arguments (spec
//! §6: "no arguments; listens on 0.0.0.0:5684"); the listen port and key
//! file path are still environment-configurable for deployment, the same
//! `.env`-plus-override precedence `asc-gateway::config` uses.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::DispatcherError;

/// Fixed listen port per spec §6.
pub const DEFAULT_LISTEN_PORT: u16 = 5684;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: IpAddr,
    pub listen_port: u16,
    pub key_file: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, DispatcherError> {
        let _ = dotenvy::dotenv();

        let listen_addr = env_var("ASC_LISTEN_ADDR")
            .map(|s| parse_addr(&s))
            .transpose()?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let listen_port = env_parse("ASC_DISPATCHER_PORT")?.unwrap_or(DEFAULT_LISTEN_PORT);

        let key_file = env_var("ASC_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_key_file_path);

        let log_path = env_var("ASC_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);

        Ok(Self {
            listen_addr,
            listen_port,
            key_file,
            log_path,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, DispatcherError> {
    match env_var(key) {
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DispatcherError::Config(format!("{key} is not a valid value: {s}"))),
        None => Ok(None),
    }
}

fn parse_addr(s: &str) -> Result<IpAddr, DispatcherError> {
    s.parse()
        .map_err(|_| DispatcherError::Config(format!("invalid IP address: {s}")))
}

fn default_key_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asc-dispatcher")
        .join("keys.txt")
}

fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asc-dispatcher")
        .join("dispatcher.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn default_listen_port_matches_spec() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ASC_DISPATCHER_PORT");
        let config = Config::load().unwrap();
        assert_eq!(config.listen_port, 5684);
    }

    #[test]
    fn rejects_invalid_listen_addr_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ASC_LISTEN_ADDR", "not-an-ip");
        let result = Config::load();
        std::env::remove_var("ASC_LISTEN_ADDR");
        assert!(result.is_err());
    }
}
