// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared request vocabulary (spec §3, §6).

use serde::{Deserialize, Serialize};

/// The kind of dispatch-requiring event a gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    FloorCall,
    CabinRequest,
    Emergency,
}

/// Requested direction of travel for a floor call (`direccion_llamada`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "SUBIENDO")]
    Up,
    #[serde(rename = "BAJANDO")]
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "SUBIENDO",
            Direction::Down => "BAJANDO",
        }
    }

    /// Parse the wire string, rejecting anything but `SUBIENDO`/`BAJANDO`
    /// (spec §8.10: `"UP"` must be rejected as VALIDATION).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUBIENDO" => Some(Direction::Up),
            "BAJANDO" => Some(Direction::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_spanish_tokens() {
        assert_eq!(Direction::parse("SUBIENDO"), Some(Direction::Up));
        assert_eq!(Direction::parse("BAJANDO"), Some(Direction::Down));
        assert_eq!(Direction::parse("UP"), None);
        assert_eq!(Direction::parse(""), None);
    }
}
