// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field-bus frame ids and payload layouts (spec §6).
//!
//! Frames are opaque datagrams: an id, up to 8 payload bytes, and a dlc
//! (data length code). The actual bus transport is abstracted behind
//! `FrameSource`/`FrameSink` in the gateway crate; this module only
//! knows how to lay out and read the payload bytes.

use asc_core::Direction;

/// Maximum payload bytes per frame.
pub const MAX_FRAME_DATA: usize = 8;

pub const FRAME_FLOOR_CALL: u16 = 0x100;
pub const FRAME_CABIN_REQUEST: u16 = 0x200;
pub const FRAME_ARRIVAL: u16 = 0x300;
pub const FRAME_EMERGENCY: u16 = 0x400;
pub const FRAME_ERROR: u16 = 0xFE;

/// Error codes carried in byte 1 of an 0xFE error frame (spec §6, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBusErrorCode {
    MissingBody = 0x01,
    DispatcherError = 0x02,
    MalformedSuccessBody = 0x03,
}

impl FieldBusErrorCode {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// An opaque field-bus datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u16,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(id: u16, data: Vec<u8>) -> Self {
        debug_assert!(data.len() <= MAX_FRAME_DATA);
        Self { id, data }
    }

    pub fn dlc(&self) -> u8 {
        self.data.len() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorCallPayload {
    pub origin_floor: u8,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CabinRequestPayload {
    pub car_index_0based: u8,
    pub target_floor: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalPayload {
    pub car_index_0based: u8,
    pub current_floor: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyPayload {
    pub car_index_0based: u8,
    pub current_floor: u8,
    pub emergency_kind: u8,
}

/// Decode errors: the payload didn't have the shape the frame id requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("frame {frame_id:#x}: expected {expected} payload bytes, got {got}")]
    WrongLength {
        frame_id: u16,
        expected: usize,
        got: usize,
    },
    #[error("frame {frame_id:#x}: invalid direction byte {byte}")]
    InvalidDirection { frame_id: u16, byte: u8 },
}

pub fn decode_floor_call(frame: &Frame) -> Result<FloorCallPayload, FrameDecodeError> {
    require_len(frame, 2)?;
    let direction = match frame.data[1] {
        0 => Direction::Up,
        1 => Direction::Down,
        byte => {
            return Err(FrameDecodeError::InvalidDirection {
                frame_id: frame.id,
                byte,
            })
        }
    };
    Ok(FloorCallPayload {
        origin_floor: frame.data[0],
        direction,
    })
}

pub fn decode_cabin_request(frame: &Frame) -> Result<CabinRequestPayload, FrameDecodeError> {
    require_len(frame, 2)?;
    Ok(CabinRequestPayload {
        car_index_0based: frame.data[0],
        target_floor: frame.data[1],
    })
}

pub fn decode_arrival(frame: &Frame) -> Result<ArrivalPayload, FrameDecodeError> {
    require_len(frame, 2)?;
    Ok(ArrivalPayload {
        car_index_0based: frame.data[0],
        current_floor: frame.data[1],
    })
}

pub fn decode_emergency(frame: &Frame) -> Result<EmergencyPayload, FrameDecodeError> {
    require_len(frame, 3)?;
    Ok(EmergencyPayload {
        car_index_0based: frame.data[0],
        current_floor: frame.data[1],
        emergency_kind: frame.data[2],
    })
}

fn require_len(frame: &Frame, expected: usize) -> Result<(), FrameDecodeError> {
    if frame.data.len() < expected {
        Err(FrameDecodeError::WrongLength {
            frame_id: frame.id,
            expected,
            got: frame.data.len(),
        })
    } else {
        Ok(())
    }
}

/// Build the success acknowledgement frame (spec §4.4 step 5): id = origin
/// frame id + 1, payload = car index followed by task id bytes, truncated
/// to the frame data capacity.
pub fn build_success_frame(origin_frame_id: u16, car_index: u8, task_id: &str) -> Frame {
    let mut data = Vec::with_capacity(MAX_FRAME_DATA);
    data.push(car_index);
    let remaining = MAX_FRAME_DATA - data.len();
    data.extend(task_id.as_bytes().iter().take(remaining).copied());
    Frame::new(origin_frame_id.wrapping_add(1), data)
}

/// Build the error frame (spec §4.4 step 6): id 0xFE, data[0] = origin id &
/// 0xFF, data[1] = the error code.
pub fn build_error_frame(origin_frame_id: u16, code: FieldBusErrorCode) -> Frame {
    Frame::new(
        FRAME_ERROR,
        vec![(origin_frame_id & 0xFF) as u8, code.as_byte()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_floor_call_up() {
        let frame = Frame::new(FRAME_FLOOR_CALL, vec![4, 0]);
        let payload = decode_floor_call(&frame).unwrap();
        assert_eq!(payload.origin_floor, 4);
        assert_eq!(payload.direction, Direction::Up);
    }

    #[test]
    fn decode_floor_call_rejects_bad_direction_byte() {
        let frame = Frame::new(FRAME_FLOOR_CALL, vec![4, 9]);
        assert!(matches!(
            decode_floor_call(&frame),
            Err(FrameDecodeError::InvalidDirection { byte: 9, .. })
        ));
    }

    #[test]
    fn decode_rejects_short_payload() {
        let frame = Frame::new(FRAME_CABIN_REQUEST, vec![1]);
        assert!(matches!(
            decode_cabin_request(&frame),
            Err(FrameDecodeError::WrongLength { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn success_frame_layout_matches_s1() {
        // Scenario S1: origin frame 0x100, car index 1, task id.
        let frame = build_success_frame(FRAME_FLOOR_CALL, 1, "T_1700000000123");
        assert_eq!(frame.id, 0x101);
        assert_eq!(frame.data[0], 1);
        assert_eq!(&frame.data[1..], b"T_1700000");
    }

    #[test]
    fn success_frame_truncates_to_capacity() {
        let frame = build_success_frame(FRAME_FLOOR_CALL, 0, "T_1700000000999");
        assert_eq!(frame.data.len(), MAX_FRAME_DATA);
    }

    #[test]
    fn error_frame_layout_matches_s2() {
        // Scenario S2: origin id 0x100, code 0x02 (dispatcher error).
        let frame = build_error_frame(FRAME_FLOOR_CALL, FieldBusErrorCode::DispatcherError);
        assert_eq!(frame.id, FRAME_ERROR);
        assert_eq!(frame.data, vec![0x00, 0x02]);
    }
}
