// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outbound request builder (spec §4.3): the 8-step algorithm that
//! turns a field-bus event into a tracked, secured POST to the dispatcher.

use rand::RngCore;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use asc_core::{BuildingId, Direction, ElevatorGroup};
use asc_protocol::{
    CabinRequestBody, EmergencyRequest, FloorCallRequest, Observation, PATH_CABIN_REQUEST,
    PATH_EMERGENCY, PATH_FLOOR_CALL,
};
use asc_transport::{CorrelationTable, SecureSessionManager, SessionFactory};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::GatewayError;
use crate::tracker::RequestTracker;
use crate::wire;

/// A request to build, named by what triggered it (spec §4.3 step 2).
pub enum OutboundRequest {
    FloorCall {
        origin_floor: i32,
        direction: Direction,
    },
    CabinRequest {
        car_id: String,
        target_floor: i32,
    },
    Emergency {
        car_id: String,
        current_floor: i32,
        emergency_kind: u8,
    },
}

/// Builds and dispatches outbound requests, holding the session, the
/// correlation table, and the per-message id sequence (spec §4.3).
pub struct OutboundRequestBuilder<F> {
    building: BuildingId,
    session: Arc<SecureSessionManager<F>>,
    correlation: Mutex<CorrelationTable<RequestTracker>>,
    message_id: AtomicU16,
}

impl<F: SessionFactory> OutboundRequestBuilder<F> {
    pub fn new(
        building: BuildingId,
        session: Arc<SecureSessionManager<F>>,
        correlation_capacity: usize,
    ) -> Self {
        Self {
            building,
            session,
            correlation: Mutex::new(CorrelationTable::new(correlation_capacity)),
            message_id: AtomicU16::new(1),
        }
    }

    pub fn correlation(&self) -> &Mutex<CorrelationTable<RequestTracker>> {
        &self.correlation
    }

    /// Steps 1-8 of spec §4.3.
    ///
    /// 1. get-or-create the secure session
    /// 2. snapshot the group's current state into `Observation`s
    /// 3. build the JSON request body for the given kind
    /// 4. mint a token and a message id
    /// 5. encode the CoAP POST to the resource path for the kind
    /// 6. register the tracker in the correlation table before sending
    /// 7. dispatch over the session
    /// 8. a dispatch failure is non-fatal: log and leave the tracker to
    ///    expire via eviction rather than propagate to the caller.
    pub async fn send(
        &self,
        frame_id: u16,
        request: OutboundRequest,
        group: &ElevatorGroup,
    ) -> Result<(), GatewayError> {
        self.session.get_or_create().await?;

        let snapshot: Vec<Observation> =
            group.cars().iter().map(Observation::from_elevator).collect();

        let (path, body, tracker) = match &request {
            OutboundRequest::FloorCall {
                origin_floor,
                direction,
            } => {
                let body = FloorCallRequest {
                    id_edificio: self.building.as_str().to_string(),
                    piso_origen_llamada: *origin_floor,
                    direccion_llamada: *direction,
                    elevadores_estado: snapshot,
                };
                let tracker = RequestTracker::floor_call(frame_id, *origin_floor, *direction);
                (PATH_FLOOR_CALL, serde_json::to_vec(&body)?, tracker)
            }
            OutboundRequest::CabinRequest { car_id, target_floor } => {
                let body = CabinRequestBody {
                    id_edificio: self.building.as_str().to_string(),
                    solicitando_ascensor_id: car_id.clone(),
                    piso_destino_solicitud: *target_floor,
                    elevadores_estado: snapshot,
                };
                let tracker = RequestTracker::cabin_request(frame_id, car_id.clone(), *target_floor);
                (PATH_CABIN_REQUEST, serde_json::to_vec(&body)?, tracker)
            }
            OutboundRequest::Emergency {
                car_id,
                current_floor,
                emergency_kind,
            } => {
                let body = EmergencyRequest {
                    id_edificio: self.building.as_str().to_string(),
                    id_ascensor: car_id.clone(),
                    piso_actual: *current_floor,
                    tipo_emergencia: *emergency_kind,
                };
                let tracker = RequestTracker::emergency(frame_id, car_id.clone(), *current_floor);
                (PATH_EMERGENCY, serde_json::to_vec(&body)?, tracker)
            }
        };

        let token = fresh_token();
        let message_id = self.message_id.fetch_add(1, Ordering::SeqCst);

        let packet = wire::encode_post(path, token.clone(), message_id, body)
            .map_err(|e| GatewayError::Wire(e.to_string()))?;

        self.correlation.lock().register(token, tracker);

        if let Err(err) = self.session.send(&packet) {
            warn!(%err, "dispatch to dispatcher failed, tracker left to expire");
            return Err(err.into());
        }

        Ok(())
    }
}

/// 8 random bytes, matching coap-lite's own token length convention.
fn fresh_token() -> Vec<u8> {
    let mut buf = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.to_vec()
}
