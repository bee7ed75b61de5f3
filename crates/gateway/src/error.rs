// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway-local error taxonomy (spec §7: TRANSPORT and INTERNAL kinds
//! that never reach the dispatcher and are absorbed at this boundary).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("secure session unavailable: {0}")]
    Session(#[from] asc_transport::SessionError),
    #[error("CoAP encode/decode error: {0}")]
    Wire(String),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
