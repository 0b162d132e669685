use core::fmt::Display;
use core::ops::{Index, IndexMut};

use log::debug;

use super::axis::Axis;
use super::positions::{f32_to_u8, PositionBuffer};
use super::state::LegState;
use crate::config::{
    LegChannels, LEG_CHANNELS, LEG_COUNT, LIFT_CLOSED, LIFT_OPEN, STRIDE_EPSILON, STRIDE_MAX,
    SWING_CLOSED, SWING_OPEN,
};
use crate::kinematics::trajectory::{lift_position, ramp, swing_position, wrap_phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegId {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl LegId {
    pub const ALL: [LegId; LEG_COUNT] = [
        LegId::FrontLeft,
        LegId::FrontRight,
        LegId::RearLeft,
        LegId::RearRight,
    ];

    pub fn channels(self) -> LegChannels {
        LEG_CHANNELS[self as usize]
    }

    pub fn is_front(self) -> bool {
        matches!(self, LegId::FrontLeft | LegId::FrontRight)
    }
}

impl Display for LegId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LegId::FrontLeft => f.write_str("Front left"),
            LegId::FrontRight => f.write_str("Front right"),
            LegId::RearLeft => f.write_str("Rear left"),
            LegId::RearRight => f.write_str("Rear right"),
        }
    }
}

impl From<usize> for LegId {
    fn from(value: usize) -> Self {
        match value {
            0 => LegId::FrontLeft,
            1 => LegId::FrontRight,
            2 => LegId::RearLeft,
            _ => LegId::RearRight,
        }
    }
}

/// Kinematic state of one leg.
///
/// Angles written to the buffer are relative to a stride origin: the swing
/// waveform is centred on the target stride length, the lift waveform on the
/// target stride height, so both stay non-negative for the servo.
#[derive(Debug, Clone)]
pub struct Leg {
    id: LegId,
    channels: LegChannels,
    phase: f32,
    phase_offset: f32,
    stride_direction: f32,
    enabled: bool,
    stride_length: f32,
    stride_height: f32,
    current_stride_length: f32,
    current_stride_height: f32,
    state: LegState,
}

impl Leg {
    pub fn new(id: LegId, phase_offset: f32, stride_direction: f32) -> Self {
        Self {
            id,
            channels: id.channels(),
            phase: 0.0,
            phase_offset,
            stride_direction: if stride_direction < 0.0 { -1.0 } else { 1.0 },
            enabled: true,
            stride_length: 0.0,
            stride_height: 0.0,
            current_stride_length: 0.0,
            current_stride_height: 0.0,
            state: LegState::Moving,
        }
    }

    /// Advances the leg along its cycle and writes both axes.
    pub fn move_by_phase(&mut self, delta: f32, incline: f32, positions: &mut PositionBuffer) {
        self.phase = wrap_phase(self.phase + delta * self.stride_direction);
        let phase = wrap_phase(self.phase + self.phase_offset);

        let z = swing_position(self.current_stride_length, phase);
        let x = lift_position(self.current_stride_height, phase, incline);
        positions.set(self.channels.swing, f32_to_u8(z + self.swing_origin()));
        positions.set(self.channels.lift, f32_to_u8(x + self.lift_origin()));
    }

    pub fn set_stride_length(&mut self, target: f32) {
        self.stride_length = target.clamp(0.0, STRIDE_MAX);
    }

    pub fn set_stride_height(&mut self, target: f32) {
        self.stride_height = target.clamp(0.0, STRIDE_MAX);
    }

    pub fn stride_length(&self) -> f32 {
        self.stride_length
    }

    pub fn stride_height(&self) -> f32 {
        self.stride_height
    }

    pub fn current_stride_length(&self) -> f32 {
        self.current_stride_length
    }

    pub fn current_stride_height(&self) -> f32 {
        self.current_stride_height
    }

    pub fn accelerate_stride_length(&mut self, target: f32) {
        self.current_stride_length = ramp(self.current_stride_length, target, STRIDE_EPSILON);
    }

    pub fn accelerate_stride_height(&mut self, target: f32) {
        self.current_stride_height = ramp(self.current_stride_height, target, STRIDE_EPSILON);
    }

    pub fn decelerate_stride_length(&mut self) {
        self.accelerate_stride_length(0.0);
    }

    pub fn decelerate_stride_height(&mut self) {
        self.accelerate_stride_height(0.0);
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn id(&self) -> LegId {
        self.id
    }

    pub fn channels(&self) -> LegChannels {
        self.channels
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn state(&self) -> LegState {
        self.state
    }

    /// First call lifts the foot clear, second call swings it out.
    pub fn open_leg(&mut self, positions: &mut PositionBuffer) -> Axis {
        let axis = match self.state {
            LegState::Opening => {
                positions.set(self.channels.swing, f32_to_u8(self.swing_origin()));
                self.state = LegState::Moving;
                Axis::Swing
            }
            LegState::Closing | LegState::Moving => {
                positions.set(self.channels.lift, f32_to_u8(LIFT_OPEN));
                self.state = LegState::Opening;
                Axis::Lift
            }
        };
        debug!("{} opened {}", self.id, axis);
        axis
    }

    /// First call swings the foot back in, second call lowers it.
    pub fn close_leg(&mut self, positions: &mut PositionBuffer) -> Axis {
        let axis = match self.state {
            LegState::Closing => {
                positions.set(self.channels.lift, f32_to_u8(LIFT_CLOSED));
                self.state = LegState::Moving;
                Axis::Lift
            }
            LegState::Opening | LegState::Moving => {
                positions.set(
                    self.channels.swing,
                    f32_to_u8(SWING_CLOSED + self.stride_length),
                );
                self.state = LegState::Closing;
                Axis::Swing
            }
        };
        debug!("{} closed {}", self.id, axis);
        axis
    }

    fn swing_origin(&self) -> f32 {
        self.stride_length + SWING_OPEN
    }

    fn lift_origin(&self) -> f32 {
        self.stride_height + LIFT_OPEN
    }
}

impl Index<LegId> for [Leg; LEG_COUNT] {
    type Output = Leg;

    fn index(&self, leg: LegId) -> &Self::Output {
        &self[leg as usize]
    }
}

impl IndexMut<LegId> for [Leg; LEG_COUNT] {
    fn index_mut(&mut self, leg: LegId) -> &mut Self::Output {
        &mut self[leg as usize]
    }
}
