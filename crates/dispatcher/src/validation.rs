// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request validation (spec §4.6, §8.9-§8.11). JSON shape and field-type
//! validation happen for free at `serde_json::from_slice` time (an
//! unparseable body or a `direccion_llamada` outside `SUBIENDO`/`BAJANDO`
//! never produces a value to validate further); this module only covers
//! the semantic checks the type system can't express.

use asc_protocol::{CabinRequestBody, DispatchError, EmergencyRequest, FloorCallRequest};

pub const MIN_FLOOR: i32 = 1;
pub const MAX_FLOOR: i32 = 50;

fn check_floor_range(floor: i32, field: &str) -> Result<(), DispatchError> {
    if (MIN_FLOOR..=MAX_FLOOR).contains(&floor) {
        Ok(())
    } else {
        Err(DispatchError::Validation(format!(
            "{field} must be in [{MIN_FLOOR}, {MAX_FLOOR}], got {floor}"
        )))
    }
}

/// Floor-call semantic validation (spec §4.6, §8.9): `piso_origen_llamada`
/// in range. Direction shape (`SUBIENDO`/`BAJANDO`) is already enforced by
/// `Direction`'s `Deserialize` impl, so an out-of-vocabulary value such as
/// `"UP"` (spec §8.10) never reaches this function — it fails at body
/// parse time with the same `Validation` kind.
pub fn validate_floor_call(req: &FloorCallRequest) -> Result<(), DispatchError> {
    if req.id_edificio.trim().is_empty() {
        return Err(DispatchError::Validation("id_edificio must not be empty".into()));
    }
    check_floor_range(req.piso_origen_llamada, "piso_origen_llamada")
}

/// Cabin-request semantic validation (spec §4.6, §8.11): target floor in
/// range, and `solicitando_ascensor_id` must appear in the supplied
/// snapshot.
pub fn validate_cabin_request(req: &CabinRequestBody) -> Result<(), DispatchError> {
    if req.id_edificio.trim().is_empty() {
        return Err(DispatchError::Validation("id_edificio must not be empty".into()));
    }
    check_floor_range(req.piso_destino_solicitud, "piso_destino_solicitud")?;

    let known = req
        .elevadores_estado
        .iter()
        .any(|obs| obs.id_ascensor == req.solicitando_ascensor_id);
    if !known {
        return Err(DispatchError::Validation(format!(
            "solicitando_ascensor_id {:?} not present in elevadores_estado",
            req.solicitando_ascensor_id
        )));
    }
    Ok(())
}

/// Emergency request semantic validation (spec §6 `/peticion_emergencia`,
/// SUPPLEMENT). `elevadores_estado` is not part of this schema, so there
/// is no "known car" check to make here.
pub fn validate_emergency(req: &EmergencyRequest) -> Result<(), DispatchError> {
    if req.id_edificio.trim().is_empty() {
        return Err(DispatchError::Validation("id_edificio must not be empty".into()));
    }
    if req.id_ascensor.trim().is_empty() {
        return Err(DispatchError::Validation("id_ascensor must not be empty".into()));
    }
    check_floor_range(req.piso_actual, "piso_actual")
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::{Direction, DoorState};
    use asc_protocol::Observation;

    fn obs(id: &str) -> Observation {
        Observation {
            id_ascensor: id.into(),
            piso_actual: 1,
            estado_puerta: DoorState::Closed,
            disponible: true,
            tarea_actual_id: None,
            destino_actual: None,
        }
    }

    #[yare::parameterized(
        below_range = { 0 },
        above_range = { 51 },
    )]
    fn floor_call_rejects_out_of_range_origin(floor: i32) {
        let req = FloorCallRequest {
            id_edificio: "E1".into(),
            piso_origen_llamada: floor,
            direccion_llamada: Direction::Up,
            elevadores_estado: vec![],
        };
        assert!(matches!(validate_floor_call(&req), Err(DispatchError::Validation(_))));
    }

    #[test]
    fn floor_call_accepts_boundary_floors() {
        for floor in [MIN_FLOOR, MAX_FLOOR] {
            let req = FloorCallRequest {
                id_edificio: "E1".into(),
                piso_origen_llamada: floor,
                direccion_llamada: Direction::Down,
                elevadores_estado: vec![],
            };
            assert!(validate_floor_call(&req).is_ok());
        }
    }

    #[test]
    fn cabin_request_rejects_unknown_requesting_car() {
        let req = CabinRequestBody {
            id_edificio: "E1".into(),
            solicitando_ascensor_id: "E1A9".into(),
            piso_destino_solicitud: 7,
            elevadores_estado: vec![obs("E1A1"), obs("E1A2")],
        };
        assert!(matches!(validate_cabin_request(&req), Err(DispatchError::Validation(_))));
    }

    #[test]
    fn cabin_request_accepts_known_requesting_car() {
        let req = CabinRequestBody {
            id_edificio: "E1".into(),
            solicitando_ascensor_id: "E1A3".into(),
            piso_destino_solicitud: 7,
            elevadores_estado: vec![obs("E1A1"), obs("E1A3")],
        };
        assert!(validate_cabin_request(&req).is_ok());
    }

    #[test]
    fn emergency_rejects_empty_car_id() {
        let req = EmergencyRequest {
            id_edificio: "E1".into(),
            id_ascensor: "".into(),
            piso_actual: 3,
            tipo_emergencia: 1,
        };
        assert!(matches!(validate_emergency(&req), Err(DispatchError::Validation(_))));
    }
}
