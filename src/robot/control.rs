//! Single owner of everything the control loop touches.
//!
//! A tick is: apply one [`Command`], advance the gait by the elapsed time,
//! flush the position buffer. The engine only borrows the buffer mutably
//! while it updates, the driver only reads it during the flush.
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, info};

use super::camera::CameraServo;
use super::commands::{Adjustment, Command, PebbleCommand};
use super::positions::PositionBuffer;
use super::state::GaitState;
use crate::config::{GaitConfig, CHANNEL_COUNT};
use crate::kinematics::gait_engine::GaitEngine;
use crate::servo::{DriverError, ServoDriver};

pub struct Robot<I2C, D> {
    engine: GaitEngine,
    driver: ServoDriver<I2C>,
    positions: PositionBuffer,
    camera: CameraServo,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Robot<I2C, D> {
    pub fn new(driver: ServoDriver<I2C>, delay: D, config: &GaitConfig) -> Self {
        let mut positions = PositionBuffer::new();
        let mut engine = GaitEngine::new(config);
        engine.init_positions(&mut positions);
        let camera = CameraServo::new(&mut positions);

        Self {
            engine,
            driver,
            positions,
            camera,
            delay,
        }
    }

    /// Applies one command and runs one control tick of `delta_time` seconds.
    pub fn handle(&mut self, command: &Command, delta_time: f32) {
        if let Some(pebble) = command.pebble {
            match pebble {
                PebbleCommand::Open => self.engine.open_pebble(
                    &mut self.positions,
                    &mut self.driver,
                    &mut self.delay,
                ),
                PebbleCommand::Close => self.engine.close_pebble(
                    &mut self.positions,
                    &mut self.driver,
                    &mut self.delay,
                ),
            }
            return;
        }

        self.apply_adjustments(command);

        if command.is_locomotion() {
            if let Some(direction) = command.translation {
                self.engine.set_direction(direction);
            }
            self.engine.set_gait_state(GaitState::Moving);
            self.engine.accelerate();
            self.engine.update_gait(delta_time, &mut self.positions);
        } else if self.engine.gait_state() == GaitState::Moving {
            self.engine.decelerate();
            self.engine.update_gait(delta_time, &mut self.positions);
            if self.engine.is_at_rest() {
                self.engine.set_gait_state(GaitState::Stopped);
            }
        }

        if let Err(e) = self.flush() {
            error!("[ROBOT] flush failed: {}", e);
        }
    }

    /// Writes the whole position buffer to the chip.
    pub fn flush(&mut self) -> Result<(), DriverError<I2C::Error>> {
        self.driver.write_all_commands(&self.positions)
    }

    /// Copy of the buffered channel values.
    pub fn positions(&self) -> [u8; CHANNEL_COUNT] {
        self.positions.snapshot()
    }

    pub fn engine(&self) -> &GaitEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GaitEngine {
        &mut self.engine
    }

    pub fn camera(&self) -> &CameraServo {
        &self.camera
    }

    /// Sleeps the chip and releases the bus.
    pub fn shutdown(self) -> I2C {
        info!("[ROBOT] shutting down");
        self.driver.deinit()
    }

    fn apply_adjustments(&mut self, command: &Command) {
        if command.turn != self.engine.turn_direction() {
            self.engine.set_turn_direction(command.turn);
        }

        if command.pan_right {
            self.camera.step_right(&mut self.positions);
        }
        if command.pan_left {
            self.camera.step_left(&mut self.positions);
        }

        match command.stride_length {
            Some(Adjustment::Increase) => self.engine.increment_stride_length(),
            Some(Adjustment::Decrease) => self.engine.decrement_stride_length(),
            None => {}
        }
        match command.stride_height {
            Some(Adjustment::Increase) => self.engine.increment_stride_height(),
            Some(Adjustment::Decrease) => self.engine.decrement_stride_height(),
            None => {}
        }
        match command.incline {
            Some(Adjustment::Increase) => self.engine.increment_incline(),
            Some(Adjustment::Decrease) => self.engine.decrement_incline(),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PAN_CHANNEL, PAN_MAX, PCA9685_ADDRESS, STRIDE_LENGTH_DEFAULT};
    use crate::robot::leg::LegId;
    use crate::robot::state::{TranslationDirection, TurnDirection};
    use crate::servo::mock::{MockDelay, MockI2c};
    use crate::servo::{registers, FRAME_LEN};

    fn robot() -> Robot<MockI2c, MockDelay> {
        let driver = ServoDriver::init(MockI2c::new(), PCA9685_ADDRESS, None).unwrap();
        Robot::new(driver, MockDelay::default(), &GaitConfig::default())
    }

    fn frames(i2c: &MockI2c) -> usize {
        i2c.writes()
            .iter()
            .filter(|w| w.len() == FRAME_LEN && w[0] == registers::LED0_ON_L)
            .count()
    }

    #[test]
    fn forward_runs_one_update_and_one_flush() {
        let mut robot = robot();
        robot.driver.i2c_mut().clear_transactions();

        robot.handle(&Command::from([0b0000_0010, 0]), 0.02);

        let engine = robot.engine();
        assert_eq!(engine.direction(), TranslationDirection::Forward);
        assert_eq!(engine.gait_state(), GaitState::Moving);
        assert_eq!(engine.turn_direction(), TurnDirection::None);
        assert_eq!(engine.incline(), 0.0);
        for leg in engine.legs() {
            assert_eq!(leg.stride_length(), STRIDE_LENGTH_DEFAULT);
        }
        assert!(engine.leg(LegId::FrontLeft).phase() > 0.0);

        let i2c = robot.shutdown();
        let writes = i2c.writes();
        assert_eq!(frames(&i2c), 1);
        assert_eq!(writes[0].len(), FRAME_LEN);
    }

    #[test]
    fn idle_commands_wind_the_gait_down() {
        let mut robot = robot();
        for _ in 0..20 {
            robot.handle(&Command::from([0b0000_0010, 0]), 0.02);
        }
        assert!(!robot.engine().is_at_rest());

        let mut ticks = 0;
        while robot.engine().gait_state() == GaitState::Moving {
            robot.handle(&Command::IDLE, 0.02);
            ticks += 1;
            assert!(ticks < 500, "gait never came to rest");
        }
        assert!(robot.engine().is_at_rest());

        let phase = robot.engine().leg(LegId::FrontLeft).phase();
        robot.handle(&Command::IDLE, 0.02);
        assert_eq!(robot.engine().leg(LegId::FrontLeft).phase(), phase);
    }

    #[test]
    fn pebble_open_skips_the_regular_tick() {
        let mut robot = robot();
        robot.driver.i2c_mut().clear_transactions();

        robot.handle(&Command::from([0b0000_0010, 0b1100_0000]), 0.02);

        assert_eq!(robot.engine().gait_state(), GaitState::Stopped);
        assert_eq!(robot.delay.total_ns, 100_000_000);
        let i2c = robot.shutdown();
        assert_eq!(frames(&i2c), 2);
    }

    #[test]
    fn adjustments_apply_without_walking() {
        let mut robot = robot();
        robot.handle(&Command::from([0b0000_1000, 0b0001_0101]), 0.02);

        let engine = robot.engine();
        assert_eq!(engine.gait_state(), GaitState::Stopped);
        assert_eq!(engine.leg(LegId::RearLeft).stride_length(), 21.0);
        assert_eq!(engine.leg(LegId::RearLeft).stride_height(), 21.0);
        assert!((engine.incline() - 0.1).abs() < 1.0e-6);
        assert_eq!(robot.camera().position(), 1);
        assert_eq!(robot.positions()[PAN_CHANNEL], PAN_MAX as u8 + 1);
    }

    #[test]
    fn turning_in_place_walks() {
        let mut robot = robot();
        robot.handle(&Command::from([0b0010_0000, 0]), 0.02);

        let engine = robot.engine();
        assert_eq!(engine.gait_state(), GaitState::Moving);
        assert_eq!(engine.turn_direction(), TurnDirection::InPlaceLeft);
        assert!(engine.leg(LegId::FrontRight).current_stride_length() < 0.0);
        assert!(engine.leg(LegId::RearRight).current_stride_length() > 0.0);
    }

    #[test]
    fn disabled_legs_hold_their_slots() {
        let mut robot = robot();
        robot.engine_mut().leg_mut(LegId::RearLeft).disable();
        let channels = LegId::RearLeft.channels();
        let before = robot.positions();

        for _ in 0..10 {
            robot.handle(&Command::from([0b0000_0010, 0]), 0.02);
        }

        let after = robot.positions();
        assert_eq!(after[channels.swing], before[channels.swing]);
        assert_eq!(after[channels.lift], before[channels.lift]);
    }

    #[test]
    fn flush_failures_are_not_fatal() {
        let mut robot = robot();
        robot.driver.i2c_mut().set_fail_writes(true);

        robot.handle(&Command::from([0b0000_0010, 0]), 0.02);
        robot.handle(&Command::from([0b0000_0010, 0]), 0.02);

        assert!(robot.flush().is_err());
        assert!(robot.engine().leg(LegId::FrontLeft).phase() > 0.0);
    }
}
