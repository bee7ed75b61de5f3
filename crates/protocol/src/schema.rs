// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON request/response bodies exchanged with the dispatcher (spec §6).

use asc_core::{DoorState, Direction, Elevator};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use serde_json::Value;

/// One car's state as seen by the gateway at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id_ascensor: String,
    pub piso_actual: i32,
    pub estado_puerta: DoorState,
    pub disponible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarea_actual_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destino_actual: Option<i32>,
}

impl Observation {
    pub fn from_elevator(car: &Elevator) -> Self {
        Self {
            id_ascensor: car.id.as_str().to_string(),
            piso_actual: car.current_floor,
            estado_puerta: car.door,
            disponible: car.available,
            tarea_actual_id: car.task_id.clone(),
            destino_actual: (car.target_floor != -1).then_some(car.target_floor),
        }
    }
}

/// `POST /peticion_piso` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorCallRequest {
    pub id_edificio: String,
    pub piso_origen_llamada: i32,
    pub direccion_llamada: Direction,
    pub elevadores_estado: Vec<Observation>,
}

/// `POST /peticion_cabina` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinRequestBody {
    pub id_edificio: String,
    pub solicitando_ascensor_id: String,
    pub piso_destino_solicitud: i32,
    pub elevadores_estado: Vec<Observation>,
}

/// (SUPPLEMENT) `POST /peticion_emergencia` request body — fixes the
/// implementation-defined emergency path spec §6 leaves open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id_edificio: String,
    pub id_ascensor: String,
    pub piso_actual: i32,
    pub tipo_emergencia: u8,
}

/// Success response body (spec §6): `{tarea_id, ascensor_asignado_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub tarea_id: String,
    pub ascensor_asignado_id: String,
}

/// Error response body (spec §6): `{error, ...diagnostic fields}`. Extra
/// fields (`edificio`, `piso_origen`, `suggestion`, ...) vary by error kind
/// (spec §7), so they're captured as a flattened JSON map rather than a
/// closed struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(flatten)]
    pub diagnostics: Map<String, Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            diagnostics: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.diagnostics.insert(key.to_string(), value.into());
        self
    }
}
