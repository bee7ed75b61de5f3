// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway configuration: building identity, car/floor counts, the
//! dispatcher endpoint, and the shared key file path.
//!
//! Loaded from a `.env` file (via `dotenvy`) merged with process
//! environment overrides, the same precedence the daemon's `env` module
//! uses: explicit environment variable wins over the file.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::GatewayError;

#[derive(Debug, Clone)]
pub struct Config {
    pub building_id: String,
    pub n_cars: u32,
    pub n_floors: u32,
    pub listen_addr: IpAddr,
    pub dispatcher_addr: IpAddr,
    pub dispatcher_port: u16,
    pub key_file: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Load from `.env` (if present) plus process environment, applying
    /// documented defaults for everything optional.
    pub fn load() -> Result<Self, GatewayError> {
        let _ = dotenvy::dotenv();

        let building_id = env_var("ASC_BUILDING_ID").unwrap_or_else(|| "E1".to_string());

        let n_cars = env_parse("ASC_N_CARS")?.unwrap_or(4);
        let n_floors = env_parse("ASC_N_FLOORS")?.unwrap_or(10);

        let listen_addr = env_var("ASC_LISTEN_ADDR")
            .map(|s| parse_addr(&s))
            .transpose()?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let dispatcher_addr = env_var("ASC_DISPATCHER_ADDR")
            .map(|s| parse_addr(&s))
            .transpose()?
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let dispatcher_port = env_parse("ASC_DISPATCHER_PORT")?.unwrap_or(5684);

        let key_file = env_var("ASC_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_key_file_path);

        let log_path = env_var("ASC_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);

        Ok(Self {
            building_id,
            n_cars,
            n_floors,
            listen_addr,
            dispatcher_addr,
            dispatcher_port,
            key_file,
            log_path,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, GatewayError> {
    match env_var(key) {
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| GatewayError::Config(format!("{key} is not a valid value: {s}"))),
        None => Ok(None),
    }
}

fn parse_addr(s: &str) -> Result<IpAddr, GatewayError> {
    s.parse()
        .map_err(|_| GatewayError::Config(format!("invalid IP address: {s}")))
}

fn default_key_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asc-gateway")
        .join("keys.txt")
}

fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asc-gateway")
        .join("gateway.log")
}
