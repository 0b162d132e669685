//! Gait generation for the pebble.
//!
//! - [`trajectory`] holds the per-leg waveforms and the stride ramp.
//! - [`gait_engine`] sequences all four legs: walking, turning and the
//!   open/close transitions.
pub mod gait_engine;
pub mod trajectory;
