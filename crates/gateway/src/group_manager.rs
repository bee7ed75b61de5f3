// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Elevator Group State Manager (spec §4.5): task assignment and the
//! tick-based motion simulator, operating on an `asc_core::ElevatorGroup`.

use asc_core::{BuildingId, DoorState, ElevatorGroup, Motion};
use tracing::{debug, warn};

pub struct GroupStateManager {
    group: ElevatorGroup,
}

impl GroupStateManager {
    /// `init(building, n_cars, n_floors)` (spec §4.5). `n_floors` bounds
    /// request validation at the dispatcher (spec §4.6) rather than the
    /// group itself, which only tracks car count.
    pub fn init(building: BuildingId, n_cars: u32, _n_floors: u32) -> Self {
        Self {
            group: ElevatorGroup::init(building, n_cars),
        }
    }

    pub fn group(&self) -> &ElevatorGroup {
        &self.group
    }

    /// Locate the car by id; set task id, target, availability=false, and
    /// motion from (target vs current). Fails silently with a log if no
    /// such car (spec §4.5 `assign_task`).
    pub fn assign_task(
        &mut self,
        car_id: &str,
        task_id: String,
        target: i32,
        direction_hint: Motion,
    ) {
        let Some(car) = self.group.find_mut(car_id) else {
            warn!(car_id, "assign_task: no such car, dropping assignment");
            return;
        };

        car.task_id = Some(task_id);
        car.target_floor = target;
        car.available = false;
        car.motion = if target > car.current_floor {
            Motion::Up
        } else if target < car.current_floor {
            Motion::Down
        } else if !matches!(direction_hint, Motion::Stopped) {
            direction_hint
        } else {
            Motion::Stopped
        };
    }

    /// Advance every car with a pending task by one tick (spec §4.5 `tick`).
    pub fn tick(&mut self) {
        for car in self.group.cars_mut() {
            if car.available || car.target_floor == -1 {
                continue;
            }

            if car.current_floor != car.target_floor {
                // Close the door and advance in the same tick (spec §4.5:
                // "close doors if open, set motion ... then advance current
                // by ±1") rather than spending a tick on the door alone.
                car.door = DoorState::Closed;

                if matches!(car.motion, Motion::Stopped | Motion::Unknown) {
                    car.motion = if car.target_floor > car.current_floor {
                        Motion::Up
                    } else {
                        Motion::Down
                    };
                }

                car.current_floor += match car.motion {
                    Motion::Up => 1,
                    Motion::Down => -1,
                    Motion::Stopped | Motion::Unknown => 0,
                };

                if car.current_floor == car.target_floor {
                    complete_task(car);
                }
            } else {
                complete_task(car);
            }
        }
    }
}

/// Task completion (spec §4.5, §9 Open Question: clear the task id after
/// the completion is logged — no behavior depends on the other order).
fn complete_task(car: &mut asc_core::Elevator) {
    debug!(car = %car.id, task = ?car.task_id, "task completed");
    car.door = DoorState::Open;
    car.available = true;
    car.task_id = None;
    car.target_floor = -1;
    car.motion = Motion::Stopped;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_task_sets_motion_up_when_target_above_current() {
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 2, 10);
        mgr.assign_task("E1A1", "T_1".into(), 5, Motion::Stopped);
        let car = mgr.group().find("E1A1").unwrap();
        assert_eq!(car.motion, Motion::Up);
        assert!(!car.available);
        assert_eq!(car.target_floor, 5);
    }

    #[test]
    fn assign_task_unknown_car_is_a_silent_no_op() {
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 1, 10);
        mgr.assign_task("E1A9", "T_1".into(), 5, Motion::Stopped);
        assert!(mgr.group().find("E1A1").unwrap().available);
    }

    #[test]
    fn tick_advances_one_floor_toward_target() {
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 1, 10);
        mgr.assign_task("E1A1", "T_1".into(), 5, Motion::Stopped);
        // car starts at floor 1; closing+advancing happens on the first tick
        // after the door-closed branch runs (door starts CLOSED already).
        mgr.tick();
        let car = mgr.group().find("E1A1").unwrap();
        assert_eq!(car.current_floor, 2);
        assert!(!car.available);
    }

    #[test]
    fn scenario_s5_tick_completion_after_two_ticks() {
        // S5: car at floor 3, target 5, motion UP, availability false.
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 1, 10);
        {
            let car = mgr.group.find_mut("E1A1").unwrap();
            car.current_floor = 3;
        }
        mgr.assign_task("E1A1", "T_1".into(), 5, Motion::Stopped);

        mgr.tick();
        assert_eq!(mgr.group().find("E1A1").unwrap().current_floor, 4);

        mgr.tick();
        let car = mgr.group().find("E1A1").unwrap();
        assert_eq!(car.current_floor, 5);
        assert!(car.available);
        assert!(car.task_id.is_none());
        assert_eq!(car.door, DoorState::Open);
        assert_eq!(car.motion, Motion::Stopped);
    }

    #[test]
    fn tick_completes_immediately_when_already_at_target() {
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 1, 10);
        mgr.assign_task("E1A1", "T_1".into(), 1, Motion::Stopped);
        mgr.tick();
        let car = mgr.group().find("E1A1").unwrap();
        assert!(car.available);
        assert_eq!(car.target_floor, -1);
    }

    #[test]
    fn tick_advances_a_reassigned_car_even_though_its_door_is_still_open() {
        // §8.6: a car with |target - current| = d >= 1 advances by exactly
        // 1 every tick, including its first tick after `complete_task` left
        // the door OPEN and `assign_task` immediately gave it a new target.
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 1, 10);
        mgr.assign_task("E1A1", "T_1".into(), 1, Motion::Stopped);
        mgr.tick();
        {
            let car = mgr.group.find_mut("E1A1").unwrap();
            assert_eq!(car.door, DoorState::Open);
        }

        mgr.assign_task("E1A1", "T_2".into(), 3, Motion::Stopped);
        mgr.tick();

        let car = mgr.group().find("E1A1").unwrap();
        assert_eq!(car.current_floor, 2);
        assert_eq!(car.door, DoorState::Closed);
    }

    #[test]
    fn idle_cars_are_untouched_by_tick() {
        let mut mgr = GroupStateManager::init(BuildingId::new("E1"), 2, 10);
        mgr.tick();
        assert!(mgr.group().cars().iter().all(|c| c.available));
    }
}
