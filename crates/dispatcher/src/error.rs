// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher-local startup/config error taxonomy. The per-request error
//! taxonomy (validation, service-exhaustion, ...) lives in
//! `asc_protocol::DispatchError` since the gateway needs to reason about
//! it too (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to load key file: {0}")]
    KeyFile(#[from] asc_transport::KeyFileError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
