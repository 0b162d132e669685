//! Robot body and control types.
//!
//! - [`leg`]: per-leg kinematic state and the open/close state machine.
//! - [`camera`]: the camera pan servo.
//! - [`positions`]: the per-channel angle buffer flushed to the PWM chip.
//! - [`commands`]: the 2-byte remote control command word.
//! - [`control`]: the [`control::Robot`] context that ties them together.
pub mod axis;
pub mod camera;
pub mod commands;
pub mod control;
pub mod leg;
pub mod positions;
pub mod state;
