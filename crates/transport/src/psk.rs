// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic identity -> pre-shared-key lookup (spec §6).
//!
//! Both gateway and dispatcher derive the key for a given identity by
//! hashing the identity bytes with a multiplier-31 polynomial hash and
//! indexing modulo the number of entries in a shared key file. This is
//! not collision-resistant, but the channel is authenticated at the
//! transport layer and the key pool is administratively provisioned
//! (spec §9).

use std::path::Path;

use thiserror::Error;

pub const DISPATCHER_HINT: &str = "ServidorCentralHint";
pub const IDENTITY_PREFIX: &str = "Gateway_Client_";

#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("failed to read key file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("key file is empty")]
    Empty,
    #[error("invalid hex on line {line}: {value}")]
    InvalidHex { line: usize, value: String },
}

/// A loaded, ordered pool of pre-shared keys.
#[derive(Debug, Clone)]
pub struct KeyFile {
    keys: Vec<Vec<u8>>,
}

impl KeyFile {
    pub fn load(path: &Path) -> Result<Self, KeyFileError> {
        let contents = std::fs::read_to_string(path).map_err(|source| KeyFileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, KeyFileError> {
        let mut keys = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            keys.push(decode_hex(line).ok_or_else(|| KeyFileError::InvalidHex {
                line: idx + 1,
                value: line.to_string(),
            })?);
        }
        if keys.is_empty() {
            return Err(KeyFileError::Empty);
        }
        Ok(Self { keys })
    }

    /// Deterministic lookup: polynomial hash (x31) over `identity`'s bytes,
    /// modulo the number of entries in the file.
    pub fn key_for(&self, identity: &str) -> &[u8] {
        let index = polynomial_hash(identity.as_bytes()) as usize % self.keys.len();
        &self.keys[index]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Polynomial hash with multiplier 31, the same algorithm used on both
/// the gateway and the dispatcher side of the key lookup.
pub fn polynomial_hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u64))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// The identity a gateway instance presents to the dispatcher (spec §4.1,
/// §6): `Gateway_Client_{pid}_{unix_seconds}`.
pub fn gateway_identity(pid: u32, unix_seconds: u64) -> String {
    format!("{IDENTITY_PREFIX}{pid}_{unix_seconds}")
}

/// Whether an identity string matches the prefix the dispatcher accepts
/// (spec §6: "accepts any identity matching the prefix `Gateway_Client_`").
pub fn is_accepted_identity(identity: &str) -> bool {
    identity.starts_with(IDENTITY_PREFIX)
}
