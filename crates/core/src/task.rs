// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier minting: `T_{unix_seconds}{millis:03}` (spec §3).
//!
//! Monotonic within a process at <= 1,000/s: if the wall clock has not
//! advanced since the previous mint, the minter borrows a millisecond
//! from the future rather than emit a duplicate or decreasing id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A minted task identifier, e.g. `T_1730000000123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints strictly non-decreasing task ids (spec §8.5).
///
/// Internally tracks milliseconds-since-epoch as a single `u64` so the
/// monotonicity check is a single atomic compare-and-swap loop.
#[derive(Debug, Default)]
pub struct TaskIdMinter {
    last_millis: AtomicU64,
}

impl TaskIdMinter {
    pub fn new() -> Self {
        Self {
            last_millis: AtomicU64::new(0),
        }
    }

    /// Mint a new id. Never empty; an empty result would be a CRITICAL
    /// internal failure per spec §4.6 and cannot occur here.
    pub fn mint(&self) -> TaskId {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let millis = loop {
            let last = self.last_millis.load(Ordering::SeqCst);
            let candidate = if now_millis > last { now_millis } else { last + 1 };
            if self
                .last_millis
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break candidate;
            }
        };

        let secs = millis / 1000;
        let ms = millis % 1000;
        TaskId(format!("T_{secs}{ms:03}"))
    }
}
