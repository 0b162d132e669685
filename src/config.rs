use core::f32::consts::PI;

// ROBOT LAYOUT
pub const LEG_COUNT: usize = 4;
/// Two servos per leg plus the camera pan servo.
pub const CHANNEL_COUNT: usize = LEG_COUNT * 2 + 1;
pub const PAN_CHANNEL: usize = CHANNEL_COUNT - 1;

/// Swing (z) and lift (x) channel of each leg, in leg id order.
pub const LEG_CHANNELS: [LegChannels; LEG_COUNT] = [
    LegChannels { swing: 0, lift: 1 }, // front left
    LegChannels { swing: 2, lift: 3 }, // front right
    LegChannels { swing: 4, lift: 5 }, // rear left
    LegChannels { swing: 6, lift: 7 }, // rear right
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegChannels {
    pub swing: usize,
    pub lift: usize,
}

/// CONST FOR MOVEMENT
pub const STRIDE_LENGTH_DEFAULT: f32 = 20.0;
pub const STRIDE_HEIGHT_DEFAULT: f32 = 20.0;
pub const STRIDE_MAX: f32 = 90.0;
pub const STRIDE_STEP: f32 = 1.0;
pub const INCLINE_STEP: f32 = 0.1;
pub const LEG_ACCELERATION_FACTOR: f32 = 0.1;
pub const STRIDE_EPSILON: f32 = 1.0e-3;
/// Converts the speed setting (oscillations) into radians per second.
pub const PHASE_SCALE: f32 = 10.0;
pub const SPEED_DEFAULT: f32 = 0.5;

// open/closed servo positions, relative to the stride origin
pub const SWING_OPEN: f32 = 0.0;
pub const LIFT_OPEN: f32 = 20.0;
pub const SWING_CLOSED: f32 = 0.0;
pub const LIFT_CLOSED: f32 = 0.0;

pub const PAN_MAX: i16 = 90;

// TIMING
pub const SERVO_COMMAND_DELAY_MS: u32 = 100;
pub const COMMAND_TIMEOUT_SECS: u64 = 1;

// NETWORK
pub const COMMAND_PORT: u16 = 8080;
pub const COMMAND_SIZE: usize = 2;
pub const RX_BUF_SIZE: usize = 64;
pub const RX_META_SIZE: usize = 4;

// PCA9685
pub const PCA9685_ADDRESS: u8 = 0x40;
pub const OSCILLATOR_FREQUENCY_HZ: u32 = 25_000_000;
pub const SERVO_FREQUENCY_HZ: f32 = 50.0;
/// SG90 pulse bounds in ticks at 50 Hz. Depending on the supply voltage these
/// may need adjusting for a particular servo.
pub const SERVO_MIN_TICK: u16 = 125;
pub const SERVO_MAX_TICK: u16 = 490;
pub const SERVO_MAX_ANGLE: u8 = 180;

/// Runtime gait parameters.
#[derive(Debug, Clone)]
pub struct GaitConfig {
    pub speed: f32,
    pub stride_length: f32,
    pub stride_height: f32,
    pub phase_offsets: [f32; LEG_COUNT],
    /// +1 or -1; the rear pair runs mirrored to get a trot-like pattern
    pub stride_directions: [f32; LEG_COUNT],
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            speed: SPEED_DEFAULT,
            stride_length: STRIDE_LENGTH_DEFAULT,
            stride_height: STRIDE_HEIGHT_DEFAULT,
            phase_offsets: [0.0, PI, PI, 2.0 * PI],
            stride_directions: [1.0, 1.0, -1.0, -1.0],
        }
    }
}
