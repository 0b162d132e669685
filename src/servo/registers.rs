//! PCA9685 register map and bit layout.

pub const MODE1: u8 = 0x00;
pub const MODE2: u8 = 0x01;
pub const LED0_ON_L: u8 = 0x06;
pub const PRESCALE: u8 = 0xFE;

/// Bytes per channel: ON_L, ON_H, OFF_L, OFF_H.
pub const CHANNEL_STRIDE: u8 = 4;
pub const CHANNELS: usize = 16;

pub mod mode1 {
    /// Low power mode, oscillator off.
    pub const SLEEP: u8 = 0x10;
    /// Register auto-increment.
    pub const AI: u8 = 0x20;
    pub const EXTCLK: u8 = 0x40;
    pub const RESTART: u8 = 0x80;
}

pub mod mode2 {
    /// Totem pole outputs instead of open drain.
    pub const OUTDRV: u8 = 0x04;
}

pub const PRESCALE_MIN: u8 = 3;
pub const PRESCALE_MAX: u8 = 255;
pub const PWM_FREQ_MIN: f32 = 1.0;
/// Datasheet limit is 3052 Hz with a 50 MHz external clock.
pub const PWM_FREQ_MAX: f32 = 3500.0;
pub const PWM_RESOLUTION: f32 = 4096.0;
pub const MAX_DUTY: u16 = 4095;
/// Bit 12 of an ON or OFF pair forces the output fully on or off.
pub const FULL_TICK: u16 = 4096;

/// Address of a channel's ON_L register.
pub fn channel_base(channel: u8) -> u8 {
    LED0_ON_L + CHANNEL_STRIDE * channel
}
