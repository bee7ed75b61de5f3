// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The response router (spec §4.4): matches an inbound dispatcher
//! response to its tracker, applies a successful assignment to the group
//! state, and synthesizes the field-bus reply frame.

use asc_core::Motion;
use asc_protocol::{Frame, FieldBusErrorCode, StatusCode, SuccessResponse};
use asc_transport::CorrelationTable;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::group_manager::GroupStateManager;
use crate::tracker::{Origin, RequestTracker};
use crate::wire::{self, DecodedResponse};

pub struct ResponseRouter;

impl ResponseRouter {
    /// Route one decoded datagram (spec §4.4, steps 1-6).
    ///
    /// 1. extract the response token and status from the packet
    /// 2. find (and remove) the tracker registered under that token; a
    ///    miss (evicted/orphaned/unsolicited) is dropped silently
    /// 3. classify success vs failure from the status code and body: a
    ///    success status with an empty payload is `MISSING-BODY` (0x01),
    ///    distinct from a success status whose payload fails to parse as
    ///    `SuccessResponse` (`MALFORMED-SUCCESS-BODY`, 0x03)
    /// 4. on success: parse `SuccessResponse`, apply the assignment to the
    ///    group state manager
    /// 5. synthesize the outbound field-bus frame: success -> id+1 with
    ///    car index + task id; failure -> 0xFE with the origin id and an
    ///    error code
    /// 6. frames from a request with no field-bus origin (a gateway
    ///    resource call) are not re-emitted onto the bus
    pub fn route(
        bytes: &[u8],
        correlation: &Mutex<CorrelationTable<RequestTracker>>,
        group: &mut GroupStateManager,
    ) -> Option<Frame> {
        let decoded = match wire::decode_response(bytes) {
            Ok(d) => d,
            Err(err) => {
                warn!(%err, "dropping undecodable dispatcher datagram");
                return None;
            }
        };

        let tracker = correlation.lock().remove(&decoded.token)?;

        let frame_id = tracker.origin_frame_id();

        let frame = if is_success(&decoded) {
            if decoded.payload.is_empty() {
                // A success status with no payload at all is distinct from
                // one whose payload fails to parse: the dispatcher answered
                // but sent nothing to act on (spec §4.4 step 6, §7).
                frame_id.map(|id| asc_protocol::fieldbus::build_error_frame(id, FieldBusErrorCode::MissingBody))
            } else {
                apply_success(&decoded, &tracker, group)
                    .map(|(car_index, task_id)| {
                        frame_id.map(|id| asc_protocol::fieldbus::build_success_frame(id, car_index, &task_id))
                    })
                    .unwrap_or_else(|| {
                        frame_id.map(|id| {
                            asc_protocol::fieldbus::build_error_frame(id, FieldBusErrorCode::MalformedSuccessBody)
                        })
                    })
            }
        } else {
            frame_id.map(|id| asc_protocol::fieldbus::build_error_frame(id, FieldBusErrorCode::DispatcherError))
        };

        match &tracker.origin {
            Origin::FieldBus { .. } => frame,
            Origin::GatewayResource { .. } => None,
        }
    }

    /// Build the error frame for a non-fatal send failure (spec §4.3 step
    /// 8 feeding back into §4.4 step 5/6): the request never reached the
    /// dispatcher, so there is no token to key on, only the origin frame.
    pub fn send_failure_frame(origin_frame_id: u16) -> Frame {
        asc_protocol::fieldbus::build_error_frame(origin_frame_id, FieldBusErrorCode::DispatcherError)
    }
}

fn is_success(decoded: &DecodedResponse) -> bool {
    decoded.status.map(StatusCode::is_success).unwrap_or(false)
}

/// Apply a successful assignment to the group (spec §4.4 step 4, §4.5).
/// Returns the car index (from the trailing digit of the assigned car id,
/// `0xFF` if unparsable) and task id used to build the success frame, or
/// `None` if the body could not be parsed as `SuccessResponse`.
fn apply_success(
    decoded: &DecodedResponse,
    tracker: &RequestTracker,
    group: &mut GroupStateManager,
) -> Option<(u8, String)> {
    let body: SuccessResponse = serde_json::from_slice(&decoded.payload).ok()?;

    let direction_hint = tracker.requested_direction.map_or(Motion::Stopped, |d| match d {
        asc_core::Direction::Up => Motion::Up,
        asc_core::Direction::Down => Motion::Down,
    });

    // Cabin requests carry their own target floor; floor calls and
    // emergencies only know the origin floor, which becomes the initial
    // target since the response body doesn't echo one back.
    let target = tracker.target_floor.or(tracker.origin_floor).unwrap_or(0);

    let car_id = asc_core::ElevatorId::new(body.ascensor_asignado_id.clone());
    group.assign_task(car_id.as_str(), body.tarea_id.clone(), target, direction_hint);

    debug!(car = %car_id, task = %body.tarea_id, "assignment applied from dispatcher response");

    let car_index = car_id.zero_based_index().unwrap_or(0xFF);
    Some((car_index, body.tarea_id))
}
