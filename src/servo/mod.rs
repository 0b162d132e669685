//! PCA9685 servo driver.
//!
//! Owns the I2C handle and the chip parameters the chip cannot report back
//! (oscillator frequency, last prescale). Angles from the [`PositionBuffer`]
//! are mapped linearly onto the SG90 tick range and written as one
//! auto-incremented block per control tick.
//!
//! The prescaler only latches while the oscillator is stopped, so every path
//! that writes [`registers::PRESCALE`] puts the chip to sleep first and
//! restarts it afterwards.
use core::fmt;

use embedded_hal::i2c::I2c;
use fugit::HertzU32;
use log::{debug, error, info};
use micromath::F32Ext;

use crate::config::{
    CHANNEL_COUNT, OSCILLATOR_FREQUENCY_HZ, SERVO_FREQUENCY_HZ, SERVO_MAX_ANGLE, SERVO_MAX_TICK,
    SERVO_MIN_TICK,
};
use crate::robot::positions::PositionBuffer;
use registers::{mode1, mode2};

#[cfg(test)]
pub(crate) mod mock;
pub mod registers;

/// Register address byte followed by one tick pair per buffered channel.
pub const FRAME_LEN: usize = 1 + CHANNEL_COUNT * registers::CHANNEL_STRIDE as usize;

#[derive(Debug)]
pub enum DriverError<E> {
    /// The transport rejected a transaction.
    I2c(E),
    /// The chip only has 16 outputs.
    InvalidChannel(u8),
}

impl<E: fmt::Debug> fmt::Display for DriverError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::I2c(e) => write!(f, "I2C error: {:?}", e),
            DriverError::InvalidChannel(channel) => write!(f, "invalid PWM channel {}", channel),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DriverError<E> {}

/// Output stage configuration (MODE2 OUTDRV).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    OpenDrain,
    TotemPole,
}

pub struct ServoDriver<I2C> {
    i2c: I2C,
    address: u8,
    oscillator_frequency: HertzU32,
    prescale: u8,
}

impl<I2C> fmt::Debug for ServoDriver<I2C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServoDriver")
            .field("address", &self.address)
            .field("oscillator_hz", &self.oscillator_frequency.raw())
            .field("prescale", &self.prescale)
            .finish()
    }
}

impl<I2C: I2c> ServoDriver<I2C> {
    /// Resets the chip and configures its clock.
    ///
    /// With `prescale_override` the chip is switched to its EXTCLK input using
    /// that prescale, otherwise the internal oscillator is set up for 50 Hz
    /// servo pulses.
    ///
    /// # Errors
    /// Fails if the chip does not answer on `address`.
    pub fn init(
        i2c: I2C,
        address: u8,
        prescale_override: Option<u8>,
    ) -> Result<Self, DriverError<I2C::Error>> {
        let mut driver = Self {
            i2c,
            address,
            oscillator_frequency: HertzU32::from_raw(OSCILLATOR_FREQUENCY_HZ),
            prescale: 0,
        };

        driver.reset()?;
        match prescale_override {
            Some(prescale) => driver.set_ext_clk(prescale)?,
            None => driver.set_pwm_freq(SERVO_FREQUENCY_HZ)?,
        }
        driver.set_oscillator_frequency(HertzU32::from_raw(OSCILLATOR_FREQUENCY_HZ));

        info!("[SERVO] PCA9685 ready at {:#04x}: {:?}", address, driver);
        Ok(driver)
    }

    /// Puts the chip to sleep and hands the bus back. A failing sleep is only
    /// logged, the bus is released regardless.
    pub fn deinit(mut self) -> I2C {
        if let Err(e) = self.sleep() {
            error!("[SERVO] unable to put the PCA9685 to sleep: {}", e);
        }
        self.i2c
    }

    pub fn reset(&mut self) -> Result<(), DriverError<I2C::Error>> {
        self.write8(registers::MODE1, mode1::RESTART)
    }

    pub fn sleep(&mut self) -> Result<(), DriverError<I2C::Error>> {
        let awake = self.read8(registers::MODE1)?;
        self.write8(registers::MODE1, awake | mode1::SLEEP)
    }

    pub fn wakeup(&mut self) -> Result<(), DriverError<I2C::Error>> {
        let asleep = self.read8(registers::MODE1)?;
        self.write8(registers::MODE1, asleep & !mode1::SLEEP)
    }

    /// Switches to the EXTCLK pin. The clock source bit is only honoured while
    /// the chip sleeps, it sticks until the next power cycle.
    pub fn set_ext_clk(&mut self, prescale: u8) -> Result<(), DriverError<I2C::Error>> {
        let prescale = prescale.clamp(registers::PRESCALE_MIN, registers::PRESCALE_MAX);
        let old_mode = self.read8(registers::MODE1)?;
        let asleep = (old_mode & !mode1::RESTART) | mode1::SLEEP;
        self.write8(registers::MODE1, asleep)?;

        let external = asleep | mode1::EXTCLK;
        self.write8(registers::MODE1, external)?;
        self.write8(registers::PRESCALE, prescale)?;
        self.prescale = prescale;

        self.write8(
            registers::MODE1,
            (external & !mode1::SLEEP) | mode1::RESTART | mode1::AI,
        )?;
        debug!("[SERVO] external clock, prescale {}", prescale);
        Ok(())
    }

    /// Sets the output frequency of all channels, clamped to 1..=3500 Hz.
    pub fn set_pwm_freq(&mut self, freq: f32) -> Result<(), DriverError<I2C::Error>> {
        let prescale = prescale_for(self.oscillator_frequency, freq);

        let old_mode = self.read8(registers::MODE1)?;
        let asleep = (old_mode & !mode1::RESTART) | mode1::SLEEP;
        self.write8(registers::MODE1, asleep)?;
        self.write8(registers::PRESCALE, prescale)?;
        self.prescale = prescale;
        self.write8(registers::MODE1, old_mode)?;
        self.write8(registers::MODE1, old_mode | mode1::RESTART | mode1::AI)?;

        debug!("[SERVO] {} Hz -> prescale {}", freq, prescale);
        Ok(())
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), DriverError<I2C::Error>> {
        let old_mode = self.read8(registers::MODE2)?;
        let new_mode = match mode {
            OutputMode::TotemPole => old_mode | mode2::OUTDRV,
            OutputMode::OpenDrain => old_mode & !mode2::OUTDRV,
        };
        self.write8(registers::MODE2, new_mode)
    }

    pub fn read_prescale(&mut self) -> Result<u8, DriverError<I2C::Error>> {
        self.read8(registers::PRESCALE)
    }

    /// Reads back the (on, off) tick pair of a channel.
    pub fn read_channel(&mut self, channel: u8) -> Result<(u16, u16), DriverError<I2C::Error>> {
        let base = Self::channel_base(channel)?;
        let mut ticks = [0u8; 4];
        self.i2c
            .write_read(self.address, &[base], &mut ticks)
            .map_err(DriverError::I2c)?;
        Ok((
            u16::from_le_bytes([ticks[0], ticks[1]]),
            u16::from_le_bytes([ticks[2], ticks[3]]),
        ))
    }

    /// Writes a channel's four tick registers in a single transaction.
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), DriverError<I2C::Error>> {
        let base = Self::channel_base(channel)?;
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.i2c
            .write(self.address, &[base, on_l, on_h, off_l, off_h])
            .map_err(DriverError::I2c)
    }

    /// Sets a duty cycle out of 4095, handling the always on/off encodings.
    /// `invert` is for outputs sinking to ground.
    pub fn set_pin(
        &mut self,
        channel: u8,
        value: u16,
        invert: bool,
    ) -> Result<(), DriverError<I2C::Error>> {
        let (on, off) = pin_ticks(value, invert);
        self.set_pwm(channel, on, off)
    }

    /// Moves a single servo. Angles above 180 are clamped.
    pub fn set_pos(&mut self, channel: u8, angle: u8) -> Result<(), DriverError<I2C::Error>> {
        self.set_pwm(channel, 0, angle_to_ticks(angle))
    }

    /// Flushes every buffered channel in one block write starting at LED0.
    pub fn write_all_commands(
        &mut self,
        positions: &PositionBuffer,
    ) -> Result<(), DriverError<I2C::Error>> {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = registers::LED0_ON_L;
        let channels = frame[1..].chunks_exact_mut(registers::CHANNEL_STRIDE as usize);
        for (ticks, angle) in channels.zip(positions.iter()) {
            let [off_l, off_h] = angle_to_ticks(angle).to_le_bytes();
            ticks.copy_from_slice(&[0, 0, off_l, off_h]);
        }
        self.i2c
            .write(self.address, &frame)
            .map_err(DriverError::I2c)
    }

    /// Oscillator frequency used for prescale maths. The chip cannot be
    /// queried for it.
    pub fn oscillator_frequency(&self) -> HertzU32 {
        self.oscillator_frequency
    }

    pub fn set_oscillator_frequency(&mut self, frequency: HertzU32) {
        self.oscillator_frequency = frequency;
    }

    /// Last prescale written to the chip.
    pub fn prescale(&self) -> u8 {
        self.prescale
    }

    #[cfg(test)]
    pub(crate) fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    fn channel_base(channel: u8) -> Result<u8, DriverError<I2C::Error>> {
        if channel as usize >= registers::CHANNELS {
            return Err(DriverError::InvalidChannel(channel));
        }
        Ok(registers::channel_base(channel))
    }

    fn read8(&mut self, register: u8) -> Result<u8, DriverError<I2C::Error>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(DriverError::I2c)?;
        Ok(value[0])
    }

    fn write8(&mut self, register: u8, value: u8) -> Result<(), DriverError<I2C::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(DriverError::I2c)
    }
}

/// `round(osc / (freq * 4096)) - 1`, with the frequency and result clamped to
/// what the chip supports. A NaN frequency is treated as the slowest one.
pub fn prescale_for(oscillator: HertzU32, freq: f32) -> u8 {
    let freq = if freq.is_nan() {
        registers::PWM_FREQ_MIN
    } else {
        freq.clamp(registers::PWM_FREQ_MIN, registers::PWM_FREQ_MAX)
    };
    let prescale = (oscillator.raw() as f32 / (freq * registers::PWM_RESOLUTION)).round() as i32 - 1;
    prescale.clamp(
        registers::PRESCALE_MIN as i32,
        registers::PRESCALE_MAX as i32,
    ) as u8
}

/// Tick pair for a duty cycle out of 4095.
pub fn pin_ticks(value: u16, invert: bool) -> (u16, u16) {
    let value = value.min(registers::MAX_DUTY);
    let fully_on = (registers::FULL_TICK, 0);
    let fully_off = (0, registers::FULL_TICK);
    match (invert, value) {
        (false, registers::MAX_DUTY) | (true, 0) => fully_on,
        (false, 0) | (true, registers::MAX_DUTY) => fully_off,
        (false, value) => (0, value),
        (true, value) => (0, registers::MAX_DUTY - value),
    }
}

/// Linear map of 0..=180 degrees onto the servo's tick range.
pub fn angle_to_ticks(angle: u8) -> u16 {
    let angle = angle.min(SERVO_MAX_ANGLE) as u32;
    let range = (SERVO_MAX_TICK - SERVO_MIN_TICK) as u32;
    SERVO_MIN_TICK + (angle * range / SERVO_MAX_ANGLE as u32) as u16
}
