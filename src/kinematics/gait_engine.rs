use core::f32::consts::TAU;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, error, info};
use micromath::F32Ext;

use crate::config::{
    GaitConfig, INCLINE_STEP, LEG_COUNT, PHASE_SCALE, SERVO_COMMAND_DELAY_MS, STRIDE_EPSILON,
    STRIDE_STEP,
};
use crate::robot::leg::{Leg, LegId};
use crate::robot::positions::PositionBuffer;
use crate::robot::state::{GaitState, TranslationDirection, TurnDirection};
use crate::servo::ServoDriver;

/// State machine driving every leg through its gait cycle.
///
/// Turning has no dedicated actuator: the front and rear pairs are given
/// different stride lengths (halved, or negated for turning in place) and the
/// difference in leg speed swings the body around.
#[derive(Debug)]
pub struct GaitEngine {
    legs: [Leg; LEG_COUNT],
    state: GaitState,
    direction: TranslationDirection,
    turn: TurnDirection,
    incline: f32,
    /// oscillations per second, before [`PHASE_SCALE`]
    speed: f32,
}

impl GaitEngine {
    pub fn new(config: &GaitConfig) -> Self {
        let legs = LegId::ALL.map(|id| {
            let mut leg = Leg::new(
                id,
                config.phase_offsets[id as usize],
                config.stride_directions[id as usize],
            );
            leg.set_stride_length(config.stride_length);
            leg.set_stride_height(config.stride_height);
            leg
        });

        Self {
            legs,
            state: GaitState::Stopped,
            direction: TranslationDirection::Forward,
            turn: TurnDirection::None,
            incline: 0.0,
            speed: config.speed,
        }
    }

    /// Writes every leg's starting position so the first flush is sane.
    pub fn init_positions(&mut self, positions: &mut PositionBuffer) {
        let incline = self.incline;
        for leg in self.legs.iter_mut() {
            leg.move_by_phase(0.0, incline, positions);
        }
        info!("Pebble gait initialized!");
    }

    pub fn set_gait_state(&mut self, state: GaitState) {
        if self.state != state {
            debug!("[GAIT] {} -> {}", self.state, state);
        }
        self.state = state;
    }

    pub fn gait_state(&self) -> GaitState {
        self.state
    }

    /// Advances the enabled legs by `delta_time` seconds. Does nothing unless
    /// the gait is moving.
    pub fn update_gait(&mut self, delta_time: f32, positions: &mut PositionBuffer) {
        if self.state != GaitState::Moving {
            return;
        }
        let delta = TAU * self.speed * delta_time * PHASE_SCALE * self.direction.sign();
        let incline = self.incline;
        for leg in self.legs.iter_mut().filter(|leg| leg.is_enabled()) {
            leg.move_by_phase(delta, incline, positions);
        }
    }

    /// Ramps every leg's stride toward the target for the current turn.
    pub fn accelerate(&mut self) {
        let turn = self.turn;
        for leg in self.legs.iter_mut() {
            let length = length_target(turn, leg.id(), leg.stride_length());
            let height = leg.stride_height();
            leg.accelerate_stride_length(length);
            leg.accelerate_stride_height(height);
        }
    }

    /// Ramps every leg's stride toward zero.
    pub fn decelerate(&mut self) {
        for leg in self.legs.iter_mut() {
            leg.decelerate_stride_length();
            leg.decelerate_stride_height();
        }
    }

    /// True once deceleration has brought every stride to zero.
    pub fn is_at_rest(&self) -> bool {
        self.legs.iter().all(|leg| {
            leg.current_stride_length().abs() < STRIDE_EPSILON
                && leg.current_stride_height().abs() < STRIDE_EPSILON
        })
    }

    /// Opens all enabled legs in lockstep: lift, flush, settle, swing, flush.
    pub fn open_pebble<I2C: I2c, D: DelayNs>(
        &mut self,
        positions: &mut PositionBuffer,
        driver: &mut ServoDriver<I2C>,
        delay: &mut D,
    ) {
        self.step_legs(positions, Leg::open_leg);
        flush(driver, positions);
        delay.delay_ms(SERVO_COMMAND_DELAY_MS);
        self.step_legs(positions, Leg::open_leg);
        flush(driver, positions);
        info!("[GAIT] pebble open");
    }

    /// Closes all enabled legs in lockstep: swing, flush, settle, lower, flush.
    pub fn close_pebble<I2C: I2c, D: DelayNs>(
        &mut self,
        positions: &mut PositionBuffer,
        driver: &mut ServoDriver<I2C>,
        delay: &mut D,
    ) {
        self.step_legs(positions, Leg::close_leg);
        flush(driver, positions);
        delay.delay_ms(SERVO_COMMAND_DELAY_MS);
        self.step_legs(positions, Leg::close_leg);
        flush(driver, positions);
        info!("[GAIT] pebble closed");
    }

    pub fn set_direction(&mut self, direction: TranslationDirection) {
        self.direction = direction;
    }

    pub fn direction(&self) -> TranslationDirection {
        self.direction
    }

    pub fn set_turn_direction(&mut self, turn: TurnDirection) {
        debug!("[GAIT] turning {}", turn);
        self.turn = turn;
    }

    pub fn turn_direction(&self) -> TurnDirection {
        self.turn
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn incline(&self) -> f32 {
        self.incline
    }

    pub fn increment_stride_height(&mut self) {
        self.adjust_stride_height(STRIDE_STEP);
    }

    pub fn decrement_stride_height(&mut self) {
        self.adjust_stride_height(-STRIDE_STEP);
    }

    pub fn increment_stride_length(&mut self) {
        self.adjust_stride_length(STRIDE_STEP);
    }

    pub fn decrement_stride_length(&mut self) {
        self.adjust_stride_length(-STRIDE_STEP);
    }

    pub fn increment_incline(&mut self) {
        self.incline += INCLINE_STEP;
    }

    pub fn decrement_incline(&mut self) {
        self.incline -= INCLINE_STEP;
    }

    pub fn legs(&self) -> &[Leg; LEG_COUNT] {
        &self.legs
    }

    pub fn leg(&self, id: LegId) -> &Leg {
        &self.legs[id]
    }

    /// Used to enable or disable single legs.
    pub fn leg_mut(&mut self, id: LegId) -> &mut Leg {
        &mut self.legs[id]
    }

    fn adjust_stride_height(&mut self, step: f32) {
        for leg in self.legs.iter_mut() {
            leg.set_stride_height(leg.stride_height() + step);
        }
    }

    fn adjust_stride_length(&mut self, step: f32) {
        for leg in self.legs.iter_mut() {
            leg.set_stride_length(leg.stride_length() + step);
        }
    }

    fn step_legs<F>(&mut self, positions: &mut PositionBuffer, mut step: F)
    where
        F: FnMut(&mut Leg, &mut PositionBuffer) -> crate::robot::axis::Axis,
    {
        for leg in self.legs.iter_mut().filter(|leg| leg.is_enabled()) {
            step(leg, positions);
        }
    }
}

/// Stride length a leg ramps toward while turning.
fn length_target(turn: TurnDirection, leg: LegId, full: f32) -> f32 {
    match (turn, leg.is_front()) {
        (TurnDirection::None, _) => full,
        (TurnDirection::Left, true) | (TurnDirection::Right, false) => full / 2.0,
        (TurnDirection::Left, false) | (TurnDirection::Right, true) => full,
        (TurnDirection::InPlaceLeft, true) | (TurnDirection::InPlaceRight, false) => -full,
        (TurnDirection::InPlaceLeft, false) | (TurnDirection::InPlaceRight, true) => full,
    }
}

fn flush<I2C: I2c>(driver: &mut ServoDriver<I2C>, positions: &PositionBuffer) {
    if let Err(e) = driver.write_all_commands(positions) {
        error!("[GAIT] flush failed: {}", e);
    }
}
