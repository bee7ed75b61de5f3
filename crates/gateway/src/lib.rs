// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! asc-gateway: the per-building request pipeline between the field bus
//! and the central dispatcher.

pub mod config;
pub mod error;
pub mod fieldbus_bridge;
pub mod group_manager;
pub mod request_builder;
pub mod response_router;
pub mod tracker;
pub mod wire;

pub use config::Config;
pub use error::GatewayError;
pub use fieldbus_bridge::{FrameSink, FrameSource, LoopbackBus};
pub use group_manager::GroupStateManager;
pub use request_builder::{OutboundRequest, OutboundRequestBuilder};
pub use response_router::ResponseRouter;
pub use tracker::{Origin, RequestTracker};
