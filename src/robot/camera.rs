//! Camera pan servo.
//!
//! A single channel panned one unit at a time, independent of the legs.
use log::debug;

use super::positions::PositionBuffer;
use crate::config::{PAN_CHANNEL, PAN_MAX};

#[derive(Debug)]
pub struct CameraServo {
    channel: usize,
    position: i16,
    max: i16,
}

impl CameraServo {
    /// Creates the servo centred and writes its slot.
    pub fn new(positions: &mut PositionBuffer) -> Self {
        let servo = Self {
            channel: PAN_CHANNEL,
            position: 0,
            max: PAN_MAX,
        };
        servo.write(positions);
        servo
    }

    pub fn step_left(&mut self, positions: &mut PositionBuffer) {
        self.position = (self.position - 1).max(-self.max);
        self.write(positions);
    }

    pub fn step_right(&mut self, positions: &mut PositionBuffer) {
        self.position = (self.position + 1).min(self.max);
        self.write(positions);
    }

    pub fn position(&self) -> i16 {
        self.position
    }

    fn write(&self, positions: &mut PositionBuffer) {
        let slot = (self.position + self.max) as u8;
        debug!("[CAMERA] pan {} -> slot {}", self.position, slot);
        positions.set(self.channel, slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_centred() {
        let mut positions = PositionBuffer::new();
        let camera = CameraServo::new(&mut positions);
        assert_eq!(camera.position(), 0);
        assert_eq!(positions[PAN_CHANNEL], PAN_MAX as u8);
    }

    #[test]
    fn saturates_at_both_bounds() {
        let mut positions = PositionBuffer::new();
        let mut camera = CameraServo::new(&mut positions);

        for _ in 0..200 {
            camera.step_right(&mut positions);
        }
        assert_eq!(camera.position(), PAN_MAX);
        assert_eq!(positions[PAN_CHANNEL], 180);

        for _ in 0..400 {
            camera.step_left(&mut positions);
        }
        assert_eq!(camera.position(), -PAN_MAX);
        assert_eq!(positions[PAN_CHANNEL], 0);
    }

    #[test]
    fn only_touches_the_pan_slot() {
        let mut positions = PositionBuffer::new();
        let mut camera = CameraServo::new(&mut positions);
        let before = positions.snapshot();
        camera.step_left(&mut positions);
        let after = positions.snapshot();
        assert_eq!(before[..PAN_CHANNEL], after[..PAN_CHANNEL]);
        assert_eq!(after[PAN_CHANNEL], PAN_MAX as u8 - 1);
    }
}
