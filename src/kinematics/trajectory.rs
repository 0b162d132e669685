//! Foot trajectory over one gait cycle.
//!
//! A leg's phase angle walks around the unit circle; the swing axis follows
//! the cosine and the lift axis follows the sine, so the foot traces an
//! ellipse whose radii are the current stride length and height.
use core::f32::consts::{FRAC_PI_4, TAU};
use micromath::F32Ext;

use crate::config::LEG_ACCELERATION_FACTOR;

/// Normalizes an angle into `[0, 2π)`.
pub fn wrap_phase(angle: f32) -> f32 {
    let wrapped = angle % TAU;
    let wrapped = if wrapped < 0.0 { wrapped + TAU } else { wrapped };
    // a tiny negative remainder rounds up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Swing axis excursion for a phase.
pub fn swing_position(stride_length: f32, phase: f32) -> f32 {
    stride_length * phase.cos()
}

/// Lift axis excursion for a phase. The incline shifts the lift waveform by
/// up to a quarter turn per unit against the swing waveform.
pub fn lift_position(stride_height: f32, phase: f32, incline: f32) -> f32 {
    stride_height * (phase + FRAC_PI_4 * incline).sin()
}

/// One step of first-order smoothing toward `target`.
pub fn ramp(current: f32, target: f32, epsilon: f32) -> f32 {
    let next = current + LEG_ACCELERATION_FACTOR * (target - current);
    if (target - next).abs() < epsilon {
        target
    } else {
        next
    }
}
