// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The assignment policy (spec §4.6): a pure function of a snapshot and an
//! event. Floor calls rank candidates into four categories and score
//! within each; cabin requests always assign the requesting car.
//!
//! Only `piso_actual`/`destino_actual`/`disponible` are on the wire (spec
//! §3's Dispatch Snapshot carries no explicit motion field) so a car's
//! direction of travel is inferred from the sign of
//! `destino_actual - piso_actual`, which is exactly the rule the gateway's
//! own group state manager uses to derive motion on assignment
//! (`asc-gateway::group_manager::assign_task`).
//!
//! Scenario S2's narrative text describes a non-empty snapshot where every
//! car is `disponible=false`/`destino_actual=-1` (BUSY-UNKNOWN) and calls
//! for a 5.03 "no elevator available" response, but §4.6's own scoring
//! table scores BUSY-UNKNOWN cars (`400 - |current - origin|`) as valid,
//! lower-priority candidates rather than excluding them. Those two parts of
//! the source material disagree on this exact input and `original_source/`
//! carries nothing to settle it. This module follows §4.6's scoring table
//! literally: `assign_floor_call` only returns `SERVICE-EXHAUSTION` for an
//! *empty* snapshot, and a snapshot of all-BUSY-UNKNOWN cars still yields
//! the closest one as a (low-confidence) candidate. See the
//! `scenario_s2_literal_input_diverges_from_4_6_scoring` test below, and
//! DESIGN.md's Open Question decisions, for the input that exposes the
//! disagreement.

use asc_core::Direction;
use asc_protocol::{DispatchError, Observation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Category {
    BusyUnknown,
    NearFinish,
    EnRouteCompatible,
    Available,
}

fn categorize_and_score(obs: &Observation, origin: i32, direction: Direction) -> (Category, i32) {
    if obs.disponible {
        return (Category::Available, 1000 - (obs.piso_actual - origin).abs());
    }

    let Some(target) = obs.destino_actual else {
        return (Category::BusyUnknown, 400 - (obs.piso_actual - origin).abs());
    };

    let compatible = is_compatible(obs.piso_actual, target, origin, direction);
    if compatible {
        (Category::EnRouteCompatible, 800 - (obs.piso_actual - origin).abs())
    } else {
        (Category::NearFinish, 600 - (target - origin).abs())
    }
}

/// En-route compatibility (spec §4.6): motion (inferred from
/// `target - current`) matches the call direction, and the origin floor
/// lies between current and target inclusive, in the direction of travel.
fn is_compatible(current: i32, target: i32, origin: i32, direction: Direction) -> bool {
    match direction {
        Direction::Up => target > current && current <= origin && origin <= target,
        Direction::Down => target < current && target <= origin && origin <= current,
    }
}

/// Rank every car in `snapshot` for a floor call and return the winner's
/// id. Ties within the same score are broken by first occurrence in
/// snapshot order (spec §4.6, scenario S3): `Iterator::max_by_key` keeps
/// the *last* maximum on a tie, so the winner is tracked by hand with a
/// strict `>` comparison instead. An empty snapshot is
/// `SERVICE-EXHAUSTION`.
pub fn assign_floor_call<'a>(
    snapshot: &'a [Observation],
    origin: i32,
    direction: Direction,
) -> Result<&'a Observation, DispatchError> {
    let mut best: Option<(&Observation, (Category, i32))> = None;
    for obs in snapshot {
        let ranking = categorize_and_score(obs, origin, direction);
        if best.map(|(_, b)| ranking > b).unwrap_or(true) {
            best = Some((obs, ranking));
        }
    }
    best.map(|(obs, _)| obs)
        .ok_or_else(|| {
            DispatchError::ServiceExhaustion("no elevators available at the moment".into())
        })
}

/// Cabin requests are always auto-assigned to the requesting car (spec
/// §4.6): no ranking, the caller has already validated the car is present
/// in the snapshot (`validation::validate_cabin_request`).
pub fn assign_cabin_request(requesting_car_id: &str) -> &str {
    requesting_car_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::DoorState;

    fn available(id: &str, floor: i32) -> Observation {
        Observation {
            id_ascensor: id.into(),
            piso_actual: floor,
            estado_puerta: DoorState::Closed,
            disponible: true,
            tarea_actual_id: None,
            destino_actual: None,
        }
    }

    fn en_route(id: &str, floor: i32, target: i32) -> Observation {
        Observation {
            id_ascensor: id.into(),
            piso_actual: floor,
            estado_puerta: DoorState::Closed,
            disponible: false,
            tarea_actual_id: Some("T_x".into()),
            destino_actual: Some(target),
        }
    }

    fn busy_unknown(id: &str, floor: i32) -> Observation {
        Observation {
            id_ascensor: id.into(),
            piso_actual: floor,
            estado_puerta: DoorState::Closed,
            disponible: false,
            tarea_actual_id: Some("T_x".into()),
            destino_actual: None,
        }
    }

    #[test]
    fn scenario_s1_idle_closest_wins() {
        let snapshot = vec![
            available("E1A1", 1),
            available("E1A2", 5),
            available("E1A3", 9),
            available("E1A4", 3),
        ];
        let winner = assign_floor_call(&snapshot, 4, Direction::Up).unwrap();
        assert_eq!(winner.id_ascensor, "E1A2");
    }

    #[test]
    fn scenario_s2_empty_snapshot_is_service_exhaustion() {
        let err = assign_floor_call(&[], 4, Direction::Up).unwrap_err();
        assert!(matches!(err, DispatchError::ServiceExhaustion(_)));
    }

    #[test]
    fn scenario_s2_all_busy_unknown_still_yields_a_candidate() {
        // spec §4.6: "If the snapshot is empty or yields no candidate" —
        // a non-empty snapshot always yields a BUSY-UNKNOWN candidate at
        // worst, so this only fails to assign when the snapshot itself is
        // empty (tested above). Left here to document that distinction.
        let snapshot = vec![busy_unknown("E1A1", 1), busy_unknown("E1A2", 5)];
        assert!(assign_floor_call(&snapshot, 4, Direction::Up).is_ok());
    }

    #[test]
    fn scenario_s2_literal_input_diverges_from_4_6_scoring() {
        // Scenario S2's literal narrative: every car in a non-empty
        // snapshot is disponible=false with destino_actual=-1 (None here),
        // and the scenario calls for 5.03 SERVICE-EXHAUSTION. §4.6's
        // scoring table scores this exact input as two valid BUSY-UNKNOWN
        // candidates instead. This module follows §4.6 (see the module
        // doc comment): the literal S2 input below is accepted, not
        // rejected, and the closer car wins.
        let snapshot = vec![busy_unknown("E1A1", 6), busy_unknown("E1A2", 1)];
        let winner = assign_floor_call(&snapshot, 4, Direction::Up).unwrap();
        assert_eq!(winner.id_ascensor, "E1A1");
    }

    #[test]
    fn scenario_s3_en_route_pickup_tie_goes_to_first_idle() {
        let snapshot = vec![available("E1A1", 1), en_route("E1A2", 2, 8), available("E1A3", 9)];
        let winner = assign_floor_call(&snapshot, 5, Direction::Up).unwrap();
        assert_eq!(winner.id_ascensor, "E1A1");
    }

    #[test]
    fn en_route_incompatible_direction_falls_back_to_near_finish() {
        // car is heading down past the origin: not compatible with an UP call.
        let snapshot = vec![en_route("E1A1", 8, 2)];
        let (category, _) = categorize_and_score(&snapshot[0], 5, Direction::Up);
        assert_eq!(category, Category::NearFinish);
    }

    #[test]
    fn scenario_s4_cabin_auto_assigns_requesting_car() {
        assert_eq!(assign_cabin_request("E1A3"), "E1A3");
    }

    #[test]
    fn available_outranks_en_route_even_at_worse_distance() {
        let snapshot = vec![en_route("E1A1", 4, 6), available("E1A2", 40)];
        let winner = assign_floor_call(&snapshot, 5, Direction::Up).unwrap();
        assert_eq!(winner.id_ascensor, "E1A2");
    }
}
