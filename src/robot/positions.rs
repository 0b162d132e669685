//! Per-channel servo positions waiting to be flushed to the PWM controller.
//!
//! Legs and the camera servo write into the buffer during a tick; the servo
//! driver reads it once per tick when it batches every channel onto the bus.
//! Anything outside the control loop gets a copy through [`PositionBuffer::snapshot`].
use core::ops::Index;
use micromath::F32Ext;

use crate::config::CHANNEL_COUNT;

/// Value the buffer is filled with at startup.
const INITIAL_POSITION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionBuffer {
    slots: [u8; CHANNEL_COUNT],
}

impl PositionBuffer {
    pub fn new() -> Self {
        Self {
            slots: [INITIAL_POSITION; CHANNEL_COUNT],
        }
    }

    /// Writes a slot. Out of range channels are ignored, the channel table is
    /// fixed at compile time so this only guards against a bad table.
    pub fn set(&mut self, channel: usize, value: u8) {
        if let Some(slot) = self.slots.get_mut(channel) {
            *slot = value;
        }
    }

    pub fn get(&self, channel: usize) -> Option<u8> {
        self.slots.get(channel).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots.iter().copied()
    }

    pub fn snapshot(&self) -> [u8; CHANNEL_COUNT] {
        self.slots
    }
}

impl Default for PositionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for PositionBuffer {
    type Output = u8;

    fn index(&self, channel: usize) -> &Self::Output {
        &self.slots[channel]
    }
}

/// Narrows a trajectory value into a buffer slot.
pub fn f32_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, u8::MAX as f32) as u8
}
