//! Library root for the pebble firmware.
//!
//! Everything except [`tasks`] is hardware independent and builds on the host
//! for tests; [`tasks`] needs the `esp32` feature.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod kinematics;
pub mod robot;
pub mod servo;
#[cfg(feature = "esp32")]
pub mod tasks;
