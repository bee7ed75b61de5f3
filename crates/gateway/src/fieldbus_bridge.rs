// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The field-bus transport boundary. `FrameSource`/`FrameSink` abstract
//! over whatever physical bus carries frames (CAN, RS-485, ...) so the
//! dispatch logic can be exercised without real bus hardware, the same
//! way `asc-transport`'s `SecureChannel` abstracts the DTLS link.

use asc_protocol::Frame;

/// Blocking receive side of the field bus.
pub trait FrameSource: Send {
    /// Block until a frame arrives, or return `None` if the bus is
    /// closed/shut down.
    fn recv(&mut self) -> Option<Frame>;
}

/// Send side of the field bus.
pub trait FrameSink: Send {
    fn send(&mut self, frame: Frame) -> std::io::Result<()>;
}

/// An in-process loopback bus: frames pushed via the sink end are drained
/// from the source end in FIFO order. Used by integration tests and by
/// `main.rs` when no physical bus is configured.
pub struct LoopbackBus {
    queue: std::collections::VecDeque<Frame>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self {
            queue: std::collections::VecDeque::new(),
        }
    }
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for LoopbackBus {
    fn recv(&mut self) -> Option<Frame> {
        self.queue.pop_front()
    }
}

impl FrameSink for LoopbackBus {
    fn send(&mut self, frame: Frame) -> std::io::Result<()> {
        self.queue.push_back(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_protocol::fieldbus::FRAME_FLOOR_CALL;

    #[test]
    fn loopback_drains_frames_in_fifo_order() {
        let mut bus = LoopbackBus::new();
        bus.send(Frame::new(FRAME_FLOOR_CALL, vec![4, 0])).unwrap();
        bus.send(Frame::new(FRAME_FLOOR_CALL, vec![5, 1])).unwrap();

        assert_eq!(bus.recv().unwrap().data, vec![4, 0]);
        assert_eq!(bus.recv().unwrap().data, vec![5, 1]);
        assert!(bus.recv().is_none());
    }
}
