// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single elevator car's state (spec §3).

use serde::{Deserialize, Serialize};

use crate::id::ElevatorId;

/// Door state of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSING")]
    Closing,
    #[serde(rename = "CLOSED")]
    Closed,
    #[serde(rename = "OPENING")]
    Opening,
}

impl DoorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Open => "OPEN",
            DoorState::Closing => "CLOSING",
            DoorState::Closed => "CLOSED",
            DoorState::Opening => "OPENING",
        }
    }
}

/// Direction of travel, or lack thereof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    #[serde(rename = "STOPPED")]
    Stopped,
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// One elevator car. Mutated only by the gateway's group state manager
/// (spec §3: "mutated only by the group state manager").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevator {
    pub id: ElevatorId,
    pub current_floor: i32,
    pub door: DoorState,
    pub motion: Motion,
    pub available: bool,
    pub task_id: Option<String>,
    pub target_floor: i32,
}

impl Elevator {
    /// A freshly initialized car: floor 1, doors closed, stopped, available, idle.
    pub fn idle(id: ElevatorId, floor: i32) -> Self {
        Self {
            id,
            current_floor: floor,
            door: DoorState::Closed,
            motion: Motion::Stopped,
            available: true,
            task_id: None,
            target_floor: -1,
        }
    }

    /// Invariant (spec §8.2): available ⇒ no task, no target, stopped.
    pub fn available_invariant_holds(&self) -> bool {
        !self.available || (self.task_id.is_none() && self.target_floor == -1)
    }

    /// Invariant (spec §8.3): moving ⇒ doors closed and target differs from current.
    pub fn motion_invariant_holds(&self) -> bool {
        !matches!(self.motion, Motion::Up | Motion::Down)
            || (self.door == DoorState::Closed && self.target_floor != self.current_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_car_satisfies_invariants() {
        let car = Elevator::idle(ElevatorId::new("E1A1"), 1);
        assert!(car.available_invariant_holds());
        assert!(car.motion_invariant_holds());
        assert_eq!(car.target_floor, -1);
        assert!(car.task_id.is_none());
    }

    #[test]
    fn moving_car_with_open_door_violates_invariant() {
        let mut car = Elevator::idle(ElevatorId::new("E1A1"), 1);
        car.motion = Motion::Up;
        car.door = DoorState::Open;
        car.target_floor = 5;
        assert!(!car.motion_invariant_holds());
    }
}
