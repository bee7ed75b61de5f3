// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! asc-protocol: wire schemas for the field-bus and the secured
//! dispatcher request/response exchange (spec §6).

pub mod coap;
pub mod error;
pub mod fieldbus;
pub mod schema;

pub use coap::{StatusCode, CONTENT_FORMAT_JSON, PATH_CABIN_REQUEST, PATH_EMERGENCY, PATH_FLOOR_CALL};
pub use error::DispatchError;
pub use fieldbus::{Frame, FieldBusErrorCode};
pub use schema::{CabinRequestBody, EmergencyRequest, ErrorResponse, FloorCallRequest, Observation, SuccessResponse};
