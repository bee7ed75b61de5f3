// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher's resource handler (spec §4.6): decode -> validate ->
//! assign -> mint -> respond, carrying no mutable fleet state of its own
//! (spec §9 "the dispatcher's only mutable state is its validator table").

use asc_core::TaskIdMinter;
use asc_protocol::{
    CabinRequestBody, DispatchError, EmergencyRequest, ErrorResponse, FloorCallRequest,
    StatusCode, SuccessResponse, PATH_CABIN_REQUEST, PATH_EMERGENCY, PATH_FLOOR_CALL,
};
use tracing::{debug, error, warn};

use crate::policy;
use crate::validation;
use crate::wire::{self, DecodedRequest};

/// Ties request validation, the assignment policy, and task id minting
/// together. Holds no per-request or per-session state: `TaskIdMinter` is
/// the same monotonic counter regardless of which gateway called in.
pub struct ResourceHandler {
    minter: TaskIdMinter,
}

impl Default for ResourceHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandler {
    pub fn new() -> Self {
        Self {
            minter: TaskIdMinter::new(),
        }
    }

    /// Handle one decoded datagram and produce the wire bytes to send back.
    pub fn handle(&self, bytes: &[u8]) -> Vec<u8> {
        let request = match wire::decode_request(bytes) {
            Ok(r) => r,
            Err(err) => {
                warn!(%err, "dropping undecodable request datagram");
                return Vec::new();
            }
        };

        let (status, body) = self.dispatch(&request);
        match wire::encode_response(&request, status, body) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(%err, "failed to encode dispatcher response, dropping");
                Vec::new()
            }
        }
    }

    fn dispatch(&self, request: &DecodedRequest) -> (StatusCode, Vec<u8>) {
        if let Some(cf) = request.content_format {
            if cf != asc_protocol::CONTENT_FORMAT_JSON {
                return error_response(DispatchError::UnsupportedMedia);
            }
        }

        match request.path.as_str() {
            PATH_FLOOR_CALL => self.handle_floor_call(&request.body),
            PATH_CABIN_REQUEST => self.handle_cabin_request(&request.body),
            PATH_EMERGENCY => self.handle_emergency(&request.body),
            other => error_response(DispatchError::Validation(format!(
                "unknown resource path: {other}"
            ))),
        }
    }

    fn handle_floor_call(&self, body: &[u8]) -> (StatusCode, Vec<u8>) {
        let parsed: FloorCallRequest = match serde_json::from_slice(body) {
            Ok(r) => r,
            Err(err) => return error_response(DispatchError::Validation(err.to_string())),
        };
        if let Err(err) = validation::validate_floor_call(&parsed) {
            return error_response(err);
        }

        let winner = match policy::assign_floor_call(
            &parsed.elevadores_estado,
            parsed.piso_origen_llamada,
            parsed.direccion_llamada,
        ) {
            Ok(w) => w.id_ascensor.clone(),
            Err(err) => {
                return error_response_with(
                    err,
                    [("edificio", parsed.id_edificio.clone().into()), ("piso_origen", parsed.piso_origen_llamada.into())],
                )
            }
        };

        self.mint_and_respond(winner)
    }

    fn handle_cabin_request(&self, body: &[u8]) -> (StatusCode, Vec<u8>) {
        let parsed: CabinRequestBody = match serde_json::from_slice(body) {
            Ok(r) => r,
            Err(err) => return error_response(DispatchError::Validation(err.to_string())),
        };
        if let Err(err) = validation::validate_cabin_request(&parsed) {
            return error_response(err);
        }

        let winner = policy::assign_cabin_request(&parsed.solicitando_ascensor_id).to_string();
        self.mint_and_respond(winner)
    }

    fn handle_emergency(&self, body: &[u8]) -> (StatusCode, Vec<u8>) {
        let parsed: EmergencyRequest = match serde_json::from_slice(body) {
            Ok(r) => r,
            Err(err) => return error_response(DispatchError::Validation(err.to_string())),
        };
        if let Err(err) = validation::validate_emergency(&parsed) {
            return error_response(err);
        }

        // (SUPPLEMENT, see DESIGN.md) the dispatcher has no snapshot-based
        // policy decision to make for an emergency: the reporting car is
        // already identified, so it is acknowledged directly rather than
        // re-ranked against the fleet.
        self.mint_and_respond(parsed.id_ascensor)
    }

    fn mint_and_respond(&self, car_id: String) -> (StatusCode, Vec<u8>) {
        let task_id = self.minter.mint();
        if task_id.as_str().is_empty() {
            error!("task id minter produced an empty id, critical internal failure");
            return error_response(DispatchError::Internal("failed to mint task id".into()));
        }

        debug!(car = %car_id, task = %task_id, "assignment minted");
        let body = SuccessResponse {
            tarea_id: task_id.as_str().to_string(),
            ascensor_asignado_id: car_id,
        };
        (
            StatusCode::Success,
            serde_json::to_vec(&body).unwrap_or_default(),
        )
    }
}

fn error_response(err: DispatchError) -> (StatusCode, Vec<u8>) {
    let status = err.status();
    let body = err.body();
    (status, serde_json::to_vec(&body).unwrap_or_default())
}

fn error_response_with(
    err: DispatchError,
    extra: impl IntoIterator<Item = (&'static str, serde_json::Value)>,
) -> (StatusCode, Vec<u8>) {
    let status = err.status();
    let mut body: ErrorResponse = err.body();
    for (key, value) in extra {
        body = body.with(key, value);
    }
    (status, serde_json::to_vec(&body).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::Direction;
    use asc_protocol::Observation;
    use coap_lite::{CoapOption, CoapRequest, RequestType};
    use std::net::SocketAddr;

    fn build_request(path: &str, body: Vec<u8>, content_format: Option<u16>) -> Vec<u8> {
        let mut req: CoapRequest<SocketAddr> = CoapRequest::new();
        req.set_method(RequestType::Post);
        req.set_path(path);
        req.message.header.message_id = 1;
        req.message.set_token(vec![7, 7, 7, 7]);
        if let Some(cf) = content_format {
            req.message
                .add_option(CoapOption::ContentFormat, cf.to_be_bytes().to_vec());
        }
        req.message.payload = body;
        req.message.to_bytes().unwrap()
    }

    fn available(id: &str, floor: i32) -> Observation {
        Observation {
            id_ascensor: id.into(),
            piso_actual: floor,
            estado_puerta: asc_core::DoorState::Closed,
            disponible: true,
            tarea_actual_id: None,
            destino_actual: None,
        }
    }

    #[test]
    fn scenario_s1_floor_call_end_to_end() {
        let handler = ResourceHandler::new();
        let body = serde_json::to_vec(&FloorCallRequest {
            id_edificio: "E1".into(),
            piso_origen_llamada: 4,
            direccion_llamada: Direction::Up,
            elevadores_estado: vec![
                available("E1A1", 1),
                available("E1A2", 5),
                available("E1A3", 9),
                available("E1A4", 3),
            ],
        })
        .unwrap();
        let bytes = build_request(PATH_FLOOR_CALL, body, Some(asc_protocol::CONTENT_FORMAT_JSON));

        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        let parsed: SuccessResponse = serde_json::from_slice(&packet.payload).unwrap();
        assert_eq!(parsed.ascensor_asignado_id, "E1A2");
        assert!(parsed.tarea_id.starts_with("T_"));
    }

    #[test]
    fn scenario_s2_no_candidates_is_service_unavailable() {
        let handler = ResourceHandler::new();
        let body = serde_json::to_vec(&FloorCallRequest {
            id_edificio: "E1".into(),
            piso_origen_llamada: 4,
            direccion_llamada: Direction::Up,
            elevadores_estado: vec![],
        })
        .unwrap();
        let bytes = build_request(PATH_FLOOR_CALL, body, Some(asc_protocol::CONTENT_FORMAT_JSON));

        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        assert_eq!(
            packet.header.code,
            coap_lite::MessageClass::Response(coap_lite::ResponseType::ServiceUnavailable)
        );
        let body: ErrorResponse = serde_json::from_slice(&packet.payload).unwrap();
        assert_eq!(body.error, "no elevator available: no elevators available at the moment");
        assert_eq!(body.diagnostics["edificio"], "E1");
        assert_eq!(body.diagnostics["piso_origen"], 4);
    }

    #[test]
    fn scenario_s4_cabin_request_end_to_end() {
        let handler = ResourceHandler::new();
        let body = serde_json::to_vec(&CabinRequestBody {
            id_edificio: "E1".into(),
            solicitando_ascensor_id: "E1A3".into(),
            piso_destino_solicitud: 7,
            elevadores_estado: vec![available("E1A1", 1), available("E1A3", 4)],
        })
        .unwrap();
        let bytes = build_request(PATH_CABIN_REQUEST, body, Some(asc_protocol::CONTENT_FORMAT_JSON));

        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        let parsed: SuccessResponse = serde_json::from_slice(&packet.payload).unwrap();
        assert_eq!(parsed.ascensor_asignado_id, "E1A3");
    }

    #[test]
    fn unsupported_content_format_is_rejected() {
        let handler = ResourceHandler::new();
        let bytes = build_request(PATH_FLOOR_CALL, b"{}".to_vec(), Some(0)); // text/plain
        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        assert_eq!(
            packet.header.code,
            coap_lite::MessageClass::Response(coap_lite::ResponseType::UnsupportedContentFormat)
        );
    }

    #[test]
    fn absent_content_format_defaults_to_json() {
        let handler = ResourceHandler::new();
        let body = serde_json::to_vec(&FloorCallRequest {
            id_edificio: "E1".into(),
            piso_origen_llamada: 4,
            direccion_llamada: Direction::Up,
            elevadores_estado: vec![available("E1A1", 4)],
        })
        .unwrap();
        let bytes = build_request(PATH_FLOOR_CALL, body, None);
        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        assert_eq!(
            packet.header.code,
            coap_lite::MessageClass::Response(coap_lite::ResponseType::Content)
        );
    }

    #[test]
    fn unknown_path_is_bad_request() {
        let handler = ResourceHandler::new();
        let bytes = build_request("/nope", b"{}".to_vec(), Some(asc_protocol::CONTENT_FORMAT_JSON));
        let response_bytes = handler.handle(&bytes);
        let packet = coap_lite::Packet::from_bytes(&response_bytes).unwrap();
        assert_eq!(
            packet.header.code,
            coap_lite::MessageClass::Response(coap_lite::ResponseType::BadRequest)
        );
    }

    #[test]
    fn repeated_calls_with_identical_input_choose_the_same_car_and_increasing_task_ids() {
        // Testable property §8.4 / §8.8.
        let handler = ResourceHandler::new();
        let make_body = || {
            serde_json::to_vec(&FloorCallRequest {
                id_edificio: "E1".into(),
                piso_origen_llamada: 4,
                direccion_llamada: Direction::Up,
                elevadores_estado: vec![available("E1A1", 1), available("E1A2", 5)],
            })
            .unwrap()
        };

        let first = handler.handle(&build_request(
            PATH_FLOOR_CALL,
            make_body(),
            Some(asc_protocol::CONTENT_FORMAT_JSON),
        ));
        let second = handler.handle(&build_request(
            PATH_FLOOR_CALL,
            make_body(),
            Some(asc_protocol::CONTENT_FORMAT_JSON),
        ));

        let first: SuccessResponse =
            serde_json::from_slice(&coap_lite::Packet::from_bytes(&first).unwrap().payload).unwrap();
        let second: SuccessResponse =
            serde_json::from_slice(&coap_lite::Packet::from_bytes(&second).unwrap().payload).unwrap();

        assert_eq!(first.ascensor_asignado_id, second.ascensor_asignado_id);
        assert!(second.tarea_id > first.tarea_id);
    }
}
