// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for invariant-bearing domain operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown elevator: {0}")]
    UnknownElevator(String),
    #[error("floor {floor} out of range [{min}, {max}]")]
    FloorOutOfRange { floor: i32, min: i32, max: i32 },
}
