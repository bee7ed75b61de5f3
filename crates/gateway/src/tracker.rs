// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-in-flight-request record the gateway keeps until a response
//! arrives or the slot is evicted (spec §3 "Request Tracker").

use asc_core::{Direction, RequestKind};

/// Where a request came from, and therefore where its outcome must go
/// (spec §4.4 step 5).
#[derive(Debug, Clone)]
pub enum Origin {
    /// Originated from a field-bus frame; replies become an outbound frame.
    FieldBus { frame_id: u16 },
    /// Originated from a gateway-exposed resource; replies go back to that
    /// transport session/message directly. Not exercised by the field-bus
    /// loopback bridge, but modeled for completeness per spec §4.3 step 7.
    GatewayResource { session_id: u64, message_id: u16 },
}

#[derive(Debug, Clone)]
pub struct RequestTracker {
    pub origin: Origin,
    pub request_kind: RequestKind,
    pub origin_floor: Option<i32>,
    pub target_floor: Option<i32>,
    pub requesting_car_id: Option<String>,
    pub requested_direction: Option<Direction>,
}

impl RequestTracker {
    pub fn floor_call(frame_id: u16, origin_floor: i32, direction: Direction) -> Self {
        Self {
            origin: Origin::FieldBus { frame_id },
            request_kind: RequestKind::FloorCall,
            origin_floor: Some(origin_floor),
            target_floor: None,
            requesting_car_id: None,
            requested_direction: Some(direction),
        }
    }

    pub fn cabin_request(frame_id: u16, car_id: impl Into<String>, target_floor: i32) -> Self {
        Self {
            origin: Origin::FieldBus { frame_id },
            request_kind: RequestKind::CabinRequest,
            origin_floor: None,
            target_floor: Some(target_floor),
            requesting_car_id: Some(car_id.into()),
            requested_direction: None,
        }
    }

    pub fn emergency(frame_id: u16, car_id: impl Into<String>, current_floor: i32) -> Self {
        Self {
            origin: Origin::FieldBus { frame_id },
            request_kind: RequestKind::Emergency,
            origin_floor: Some(current_floor),
            target_floor: None,
            requesting_car_id: Some(car_id.into()),
            requested_direction: None,
        }
    }

    pub fn origin_frame_id(&self) -> Option<u16> {
        match self.origin {
            Origin::FieldBus { frame_id } => Some(frame_id),
            Origin::GatewayResource { .. } => None,
        }
    }
}
